pub mod error;
pub mod models;
pub mod storage;
pub mod types;
pub mod usage;

pub use error::{Error, Result};
pub use models::{Classification, ContentGenerator, Generation, GenerationRequest, RelevanceScorer};
pub use storage::ArticleStorage;
pub use types::{Article, EnrichedRecord};
pub use usage::{SessionId, Usage, UsageLedger, COST_PER_TOKEN};

