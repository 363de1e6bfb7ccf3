use std::sync::Arc;
use ae_core::{Article, ArticleStorage, Result};
use ae_inference::RelevanceRanker;
use tracing::debug;

/// The ranked article list shown to the user: store contents passed through the ranker.
pub struct Catalog {
    storage: Arc<dyn ArticleStorage>,
    ranker: RelevanceRanker,
}

impl Catalog {
    pub fn new(storage: Arc<dyn ArticleStorage>, ranker: RelevanceRanker) -> Self {
        Self { storage, ranker }
    }

    pub async fn load(&self) -> Result<Vec<Article>> {
        let articles = self.storage.list_articles().await?;
        debug!(count = articles.len(), "loaded articles from store");
        self.ranker.rank(articles).await
    }
}
