use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Context;
use clap::{ArgAction, Parser};
use ae_core::{Article, ArticleStorage, SessionId, UsageLedger};
use ae_enrich::{export, Catalog, EnrichmentWorkflow, LedgerPolicy, WorkflowConfig};
use ae_inference::{create_generator, create_scorer, RelevanceRanker, ScoringConfig};
use ae_storage::{create_storage, InMemoryUsageLedger, StorageConfig};
use ae_web::{AppState, SessionSigner};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_SESSION_SECRET: &str = "dev-secret-key";

#[derive(Parser, Debug)]
#[command(author, version, about = "Rank articles and turn the chosen ones into blog posts", long_about = None)]
pub struct Cli {
    /// Port the web app listens on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,
    /// Secret used to sign session cookies
    #[arg(long, env = "SESSION_SECRET", default_value = DEFAULT_SESSION_SECRET, hide_env_values = true)]
    session_secret: String,
    #[arg(long, default_value = "sqlite", help = "Article store to read from: sqlite (default), memory")]
    storage: String,
    #[arg(long, default_value = ae_storage::DEFAULT_DATABASE_PATH)]
    database: PathBuf,
    /// Score articles with the relevance model; when false, stored scores and order are used as-is
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    compute_scores: bool,
    /// Rescore every article on each load, not only unscored ones
    #[arg(long)]
    rescore: bool,
    #[arg(long, default_value_t = 10)]
    scoring_batch_size: usize,
    #[arg(long, default_value = "huggingface", help = "Relevance scorer: huggingface (default), dummy")]
    scorer: String,
    #[arg(long)]
    scorer_url: Option<String>,
    #[arg(long)]
    scorer_model: Option<String>,
    #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
    scorer_token: Option<String>,
    #[arg(long, default_value = "openai", help = "Content generator: openai (default), dummy")]
    generator: String,
    #[arg(long)]
    generator_url: Option<String>,
    #[arg(long)]
    generator_model: Option<String>,
    /// When generated tokens are charged: batch (whole request on success) or per-item
    #[arg(long, default_value = "batch")]
    ledger_policy: LedgerPolicy,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug, Clone)]
enum Commands {
    /// Serve the web form (default)
    Serve,
    /// Print the ranked catalog
    Rank,
    /// Enhance the given articles once and write the CSV export
    Enhance {
        /// Link of an article to enhance; repeat for several
        #[arg(long = "link", required = true)]
        links: Vec<String>,
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, default_value = "")]
        api_key: String,
        /// Where to write the export (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Load articles from a JSON array into the store
    Seed {
        file: PathBuf,
    },
}

impl Cli {
    fn scoring_config(&self) -> ScoringConfig {
        ScoringConfig {
            compute_scores: self.compute_scores,
            rescore_existing: self.rescore,
            batch_size: self.scoring_batch_size,
        }
    }

    fn catalog(&self, storage: Arc<dyn ArticleStorage>) -> anyhow::Result<Catalog> {
        let scorer = create_scorer(&self.scorer, ae_inference::Config {
            api_key: self.scorer_token.clone(),
            model_name: self.scorer_model.clone(),
            base_url: self.scorer_url.clone(),
        })?;
        info!("🧠 Relevance scorer initialized (using {})", scorer.name());
        Ok(Catalog::new(storage, RelevanceRanker::new(scorer, self.scoring_config())))
    }

    fn workflow(&self, ledger: Arc<dyn UsageLedger>) -> anyhow::Result<EnrichmentWorkflow> {
        let generator = create_generator(&self.generator, ae_inference::Config {
            api_key: None,
            model_name: self.generator_model.clone(),
            base_url: self.generator_url.clone(),
        })?;
        info!("✍️ Content generator initialized (using {})", generator.name());
        Ok(EnrichmentWorkflow::new(
            generator,
            ledger,
            WorkflowConfig {
                ledger_policy: self.ledger_policy,
                ..Default::default()
            },
        ))
    }
}

async fn seed(storage: &dyn ArticleStorage, file: &Path) -> anyhow::Result<usize> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let articles: Vec<Article> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of articles", file.display()))?;
    for article in &articles {
        storage.store_article(article).await?;
    }
    Ok(articles.len())
}

fn format_rank_line(article: &Article) -> String {
    let score = article
        .score
        .map(|s| format!("{:.3}", s))
        .unwrap_or_else(|| "-".to_string());
    format!("{:>6}  {}  {}", score, article.title, article.link)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let storage_config = StorageConfig::default().with_database_path(&cli.database);
    let storage = create_storage(&cli.storage, &storage_config)
        .await
        .context("failed to open article store")?;

    match cli.command.clone().unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if cli.session_secret == DEFAULT_SESSION_SECRET {
                warn!("⚠️ SESSION_SECRET is not set, sessions are signed with the development secret");
            }
            let state = AppState {
                catalog: cli.catalog(storage)?,
                workflow: cli.workflow(Arc::new(InMemoryUsageLedger::new()))?,
                sessions: SessionSigner::new(&cli.session_secret)?,
            };
            let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
            ae_web::serve(addr, state).await.context("web server failed")?;
        }
        Commands::Rank => {
            for article in cli.catalog(storage)?.load().await? {
                println!("{}", format_rank_line(&article));
            }
        }
        Commands::Enhance { links, api_key, output } => {
            let ledger: Arc<dyn UsageLedger> = Arc::new(InMemoryUsageLedger::new());
            let articles = cli.catalog(storage)?.load().await?;
            let selected: HashSet<String> = links.into_iter().collect();

            let enrichment = cli
                .workflow(ledger)?
                .enrich(&SessionId::new(), &articles, &selected, &api_key)
                .await?;
            let bytes = export::encode(&enrichment.records)?;

            match output {
                Some(path) => {
                    tokio::fs::write(&path, &bytes)
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("📦 Wrote {} articles to {}", enrichment.records.len(), path.display());
                }
                None => {
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&bytes).await?;
                    stdout.flush().await?;
                }
            }
            info!(
                "💰 Used {} tokens (estimated cost ${:.6})",
                enrichment.tokens_used, enrichment.usage.cost
            );
        }
        Commands::Seed { file } => {
            let count = seed(storage.as_ref(), &file).await?;
            info!("🌱 Seeded {} articles from {}", count, file.display());
        }
    }

    Ok(())
}
