use ae_enrich::{Catalog, EnrichmentWorkflow};
use crate::session::SessionSigner;

pub struct AppState {
    pub catalog: Catalog,
    pub workflow: EnrichmentWorkflow,
    pub sessions: SessionSigner,
}
