use std::cmp::Ordering;
use serde::{Deserialize, Serialize};

/// An article as read from the store. `link` is the unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub summary: String,
    #[serde(default)]
    pub score: Option<f64>,
}

impl Article {
    pub fn new(title: impl Into<String>, link: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            summary: summary.into(),
            score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Ordering for ranked lists: higher score first, unscored articles last.
    /// Equal scores compare equal so a stable sort keeps their input order.
    pub fn cmp_by_score_desc(&self, other: &Article) -> Ordering {
        match (self.score, other.score) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    /// Text handed to the relevance classifier.
    pub fn classification_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

/// A selected article together with the generated blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub article: Article,
    #[serde(default)]
    pub blog_post: String,
}

impl EnrichedRecord {
    pub fn new(article: Article, blog_post: impl Into<String>) -> Self {
        Self {
            article,
            blog_post: blog_post.into(),
        }
    }
}

impl From<Article> for EnrichedRecord {
    fn from(article: Article) -> Self {
        Self::new(article, String::new())
    }
}
