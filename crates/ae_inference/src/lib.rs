use std::fmt;

pub mod models;
pub mod prompt;
pub mod ranking;

/// Connection settings for one external model.
#[derive(Clone, Default)]
pub struct Config {
    /// Service token, for providers that authenticate the server rather than the caller
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub base_url: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .finish()
    }
}

pub use models::{create_generator, create_scorer};
pub use ranking::{RelevanceRanker, ScoringConfig};
