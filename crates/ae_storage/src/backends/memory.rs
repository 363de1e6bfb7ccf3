use async_trait::async_trait;
use ae_core::{Article, ArticleStorage, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::{StorageBackend, StorageConfig};

#[derive(Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
}

impl MemoryStore {
    pub fn store_article(&mut self, article: &Article) {
        if let Some(existing) = self.articles.iter_mut().find(|a| a.link == article.link) {
            *existing = article.clone();
        } else {
            self.articles.push(article.clone());
        }
    }

    pub fn list_articles(&self) -> Vec<Article> {
        let mut articles = self.articles.clone();
        articles.sort_by(Article::cmp_by_score_desc);
        articles
    }
}

#[derive(Default, Clone)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_articles(articles: &[Article]) -> Self {
        let storage = Self::new();
        {
            let mut store = storage.store.write().await;
            for article in articles {
                store.store_article(article);
            }
        }
        storage
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn new(_config: &StorageConfig) -> Result<Self> where Self: Sized {
        Ok(Self::default())
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    async fn list_articles(&self) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.list_articles())
    }

    async fn store_article(&self, article: &Article) -> Result<()> {
        let mut store = self.store.write().await;
        store.store_article(article);
        Ok(())
    }
}
