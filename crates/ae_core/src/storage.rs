use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// List every article, pre-scored ones first by score descending, then in insertion order
    async fn list_articles(&self) -> Result<Vec<Article>>;

    /// Store an article, replacing any existing one with the same link
    async fn store_article(&self, article: &Article) -> Result<()>;
}
