use ae_core::{Article, Usage};

/// Everything the index page shows.
pub struct IndexPage<'a> {
    pub articles: &'a [Article],
    pub usage: Usage,
    pub error: Option<&'a str>,
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn article_row(article: &Article) -> String {
    let score = article
        .score
        .map(|s| format!("{:.3}", s))
        .unwrap_or_else(|| "n/a".to_string());
    let link = escape_html(&article.link);
    format!(
        r#"      <tr>
        <td><input type="checkbox" name="selected_articles" value="{link}"></td>
        <td><a href="{link}">{title}</a><p>{summary}</p></td>
        <td>{score}</td>
      </tr>
"#,
        title = escape_html(&article.title),
        summary = escape_html(&article.summary),
    )
}

pub fn render_index(page: &IndexPage<'_>) -> String {
    let error = page
        .error
        .map(|message| format!("  <p class=\"error\">{}</p>\n", escape_html(message)))
        .unwrap_or_default();
    let rows: String = page.articles.iter().map(article_row).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Article Enhancer</title>
</head>
<body>
  <h1>Article Enhancer</h1>
{error}  <p class="usage">Tokens used: {tokens} | Estimated cost: ${cost:.6}</p>
  <form method="post" action="/">
    <label>API key <input type="password" name="api_key" autocomplete="off"></label>
    <table>
      <tr><th></th><th>Article</th><th>Relevance</th></tr>
{rows}    </table>
    <button type="submit">Enhance selected</button>
  </form>
</body>
</html>
"#,
        tokens = page.usage.tokens,
        cost = page.usage.cost,
    )
}
