use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use ae_core::{
    Article, ContentGenerator, EnrichedRecord, Error, GenerationRequest, Result, SessionId, Usage,
    UsageLedger,
};
use ae_inference::prompt::{blog_post_prompt, MAX_TOKENS, TEMPERATURE};
use tracing::{debug, error, info};

/// When generated tokens are charged to the session ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LedgerPolicy {
    /// Charge the whole request once every selected article succeeded. A failed
    /// request charges nothing, even for calls that completed before the failure.
    #[default]
    Batch,
    /// Charge each successful call as soon as it returns.
    PerItem,
}

impl FromStr for LedgerPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "batch" => Ok(Self::Batch),
            "per-item" => Ok(Self::PerItem),
            other => Err(Error::Config(format!("Unknown ledger policy: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub ledger_policy: LedgerPolicy,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            ledger_policy: LedgerPolicy::default(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    pub records: Vec<EnrichedRecord>,
    pub tokens_used: u64,
    /// Session totals after this request was charged
    pub usage: Usage,
}

pub struct EnrichmentWorkflow {
    generator: Arc<dyn ContentGenerator>,
    ledger: Arc<dyn UsageLedger>,
    config: WorkflowConfig,
}

impl fmt::Debug for EnrichmentWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnrichmentWorkflow")
            .field("generator", &self.generator.name())
            .field("config", &self.config)
            .finish()
    }
}

impl EnrichmentWorkflow {
    pub fn new(generator: Arc<dyn ContentGenerator>, ledger: Arc<dyn UsageLedger>, config: WorkflowConfig) -> Self {
        Self { generator, ledger, config }
    }

    pub fn ledger(&self) -> &Arc<dyn UsageLedger> {
        &self.ledger
    }

    /// Generate a blog post for every catalog article whose link is selected, in catalog
    /// order, one call at a time. The first generator failure aborts the request.
    pub async fn enrich(
        &self,
        session: &SessionId,
        catalog: &[Article],
        selected_links: &HashSet<String>,
        credential: &str,
    ) -> Result<Enrichment> {
        if credential.trim().is_empty() {
            return Err(Error::MissingCredential);
        }
        if selected_links.is_empty() {
            return Err(Error::EmptySelection);
        }

        let chosen: Vec<&Article> = catalog
            .iter()
            .filter(|article| selected_links.contains(&article.link))
            .collect();
        info!(
            "✍️ Enhancing {} of {} selected articles (using {})",
            chosen.len(),
            selected_links.len(),
            self.generator.name()
        );

        let mut records = Vec::with_capacity(chosen.len());
        let mut tokens_used = 0u64;
        for article in chosen {
            let prompt = blog_post_prompt(&article.title, &article.summary, &article.link);
            let request = GenerationRequest {
                prompt: &prompt,
                credential,
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            };

            let generation = self.generator.generate(&request).await.map_err(|e| {
                error!(link = %article.link, "generation failed: {}", e);
                match e {
                    Error::Generator(_) => e,
                    other => Error::Generator(other.to_string()),
                }
            })?;
            debug!(link = %article.link, tokens = generation.total_tokens, "generated blog post");

            if self.config.ledger_policy == LedgerPolicy::PerItem {
                self.ledger.update(session, generation.total_tokens).await?;
            }
            tokens_used += generation.total_tokens;
            records.push(EnrichedRecord::new(article.clone(), generation.text));
        }

        let usage = match self.config.ledger_policy {
            LedgerPolicy::Batch => self.ledger.update(session, tokens_used).await?,
            LedgerPolicy::PerItem => self.ledger.get(session).await?,
        };
        info!("💰 Session {} used {} tokens (${:.6} total)", session, tokens_used, usage.cost);

        Ok(Enrichment {
            records,
            tokens_used,
            usage,
        })
    }
}
