pub mod catalog;
pub mod export;
pub mod workflow;

pub use catalog::Catalog;
pub use export::{decode, encode, EXPORT_FILENAME, EXPORT_HEADER};
pub use workflow::{Enrichment, EnrichmentWorkflow, LedgerPolicy, WorkflowConfig};

