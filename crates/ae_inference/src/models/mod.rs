use std::sync::Arc;
use ae_core::{ContentGenerator, Error, RelevanceScorer, Result};
use url::Url;
use crate::Config;

pub mod dummy;
pub mod huggingface;
pub mod openai;

pub use dummy::{DummyGenerator, DummyScorer};
pub use huggingface::HuggingFaceScorer;
pub use openai::OpenAIGenerator;

/// Parse a configured base URL, falling back to `default`, and strip any trailing slash.
pub(crate) fn base_url(configured: Option<&str>, default: &str) -> Result<String> {
    let raw = configured.unwrap_or(default);
    let url = Url::parse(raw).map_err(|e| Error::Config(format!("Invalid base URL {}: {}", raw, e)))?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Build the relevance scorer named by `kind` (`huggingface` or `dummy`).
pub fn create_scorer(kind: &str, config: Config) -> Result<Arc<dyn RelevanceScorer>> {
    match kind {
        "huggingface" => Ok(Arc::new(HuggingFaceScorer::new(config)?)),
        "dummy" => Ok(Arc::new(DummyScorer)),
        other => Err(Error::Config(format!("Unknown scorer: {}", other))),
    }
}

/// Build the content generator named by `kind` (`openai` or `dummy`).
pub fn create_generator(kind: &str, config: Config) -> Result<Arc<dyn ContentGenerator>> {
    match kind {
        "openai" => Ok(Arc::new(OpenAIGenerator::new(config)?)),
        "dummy" => Ok(Arc::new(DummyGenerator)),
        other => Err(Error::Config(format!("Unknown generator: {}", other))),
    }
}
