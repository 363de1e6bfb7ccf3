use std::path::{Path, PathBuf};
use std::sync::Arc;
use async_trait::async_trait;
use ae_core::{ArticleStorage, Error, Result};
use tracing::info;

pub mod backends;
pub mod ledger;

pub use backends::*;
pub use ledger::InMemoryUsageLedger;

pub const DEFAULT_DATABASE_PATH: &str = "database.db";

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

impl StorageConfig {
    pub fn with_database_path(mut self, path: impl AsRef<Path>) -> Self {
        self.database_path = path.as_ref().to_path_buf();
        self
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn get_error_message() -> &'static str;
    async fn new(config: &StorageConfig) -> Result<Self> where Self: Sized;
}

/// Build the article store named by `kind` (`memory` or `sqlite`).
pub async fn create_storage(kind: &str, config: &StorageConfig) -> Result<Arc<dyn ArticleStorage>> {
    let storage: Arc<dyn ArticleStorage> = match kind {
        "memory" => Arc::new(<InMemoryStorage as StorageBackend>::new(config).await?),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let storage = <SQLiteStorage as StorageBackend>::new(config)
                .await
                .map_err(|e| Error::Storage(format!("{} ({})", SQLiteStorage::get_error_message(), e)))?;
            Arc::new(storage)
        }
        other => return Err(Error::Config(format!("Unknown storage backend: {}", other))),
    };
    info!("🏦 Article store ready (using {})", kind);
    Ok(storage)
}
