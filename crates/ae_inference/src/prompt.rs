/// Completion budget for one blog post.
pub const MAX_TOKENS: u32 = 1500;
pub const TEMPERATURE: f32 = 0.7;

/// Instruction asking for a derivative business blog post that cites its source.
pub fn blog_post_prompt(title: &str, summary: &str, link: &str) -> String {
    format!(
        r#"Given the following article title and summary:
Title: {title}
Summary: {summary}
Write a 500-800 word blog post inspired by this article, tailored for business users. Focus on the use case's value, explaining who it benefits (e.g., specific roles like managers, IT teams, or industries like tech) and why they should care (e.g., efficiency gains, cost savings, strategic advantages). Use original phrasing and structure, avoiding direct copying, but include actionable insights or recommendations for adoption. Add a citation to the original article (e.g., "Inspired by '{title}' at {link}"). Do not reproduce the original text verbatim; create a fresh perspective."#
    )
}
