use async_trait::async_trait;
use ae_core::{Article, ArticleStorage, Error, Result};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePool}, Row};
use std::path::{Path, PathBuf};
use tracing::info;
use crate::{StorageBackend, StorageConfig};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        link TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        summary TEXT NOT NULL,
        score REAL
    )
    "#,
    // Add future migrations here
];

/// Databases created before scores were stored hold only `title, link, summary`.
async fn ensure_score_column(pool: &SqlitePool) -> Result<()> {
    let columns = sqlx::query("PRAGMA table_info(articles)")
        .fetch_all(pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to inspect articles table: {}", e)))?;
    let has_score = columns
        .iter()
        .any(|column| column.try_get::<String, _>("name").map(|name| name == "score").unwrap_or(false));
    if has_score {
        return Ok(());
    }

    sqlx::query("ALTER TABLE articles ADD COLUMN score REAL")
        .execute(pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to add score column: {}", e)))?;
    info!("🏦 Added score column to existing articles table");
    Ok(())
}

pub struct SQLiteStorage {
    pool: SqlitePool,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be readable at the configured path"
    }

    async fn new(config: &StorageConfig) -> Result<Self> {
        Self::new_with_path(&config.database_path).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Storage(format!("Failed to connect to database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("Failed to run migration {}: {}", i, e)))?;
        }
        ensure_score_column(&pool).await?;

        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    async fn list_articles(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT COALESCE(title, '') AS title,
                   COALESCE(link, '') AS link,
                   COALESCE(summary, '') AS summary,
                   score
            FROM articles
            ORDER BY score IS NULL, score DESC, rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to list articles: {}", e)))?;

        let mut articles = Vec::with_capacity(rows.len());
        for row in rows {
            articles.push(Article {
                title: row.try_get("title").map_err(|e| Error::Storage(e.to_string()))?,
                link: row.try_get("link").map_err(|e| Error::Storage(e.to_string()))?,
                summary: row.try_get("summary").map_err(|e| Error::Storage(e.to_string()))?,
                score: row.try_get::<Option<f64>, _>("score").map_err(|e| Error::Storage(e.to_string()))?,
            });
        }
        Ok(articles)
    }

    async fn store_article(&self, article: &Article) -> Result<()> {
        // Legacy tables carry no unique constraint on link, so no ON CONFLICT upsert.
        let updated = sqlx::query(
            r#"
            UPDATE articles SET title = ?, summary = ?, score = ?
            WHERE link = ?
            "#,
        )
        .bind(&article.title)
        .bind(&article.summary)
        .bind(article.score)
        .bind(&article.link)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to store article: {}", e)))?;

        if updated.rows_affected() == 0 {
            sqlx::query(
                r#"
                INSERT INTO articles (link, title, summary, score)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(&article.link)
            .bind(&article.title)
            .bind(&article.summary)
            .bind(article.score)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to store article: {}", e)))?;
        }

        Ok(())
    }
}
