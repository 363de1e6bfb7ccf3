use std::collections::HashMap;
use async_trait::async_trait;
use ae_core::{Result, SessionId, Usage, UsageLedger};
use tokio::sync::RwLock;
use tracing::debug;

/// Session-scoped usage totals held in process memory.
#[derive(Default)]
pub struct InMemoryUsageLedger {
    sessions: RwLock<HashMap<SessionId, Usage>>,
}

impl InMemoryUsageLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageLedger for InMemoryUsageLedger {
    async fn get(&self, session: &SessionId) -> Result<Usage> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session).copied().unwrap_or_default())
    }

    async fn update(&self, session: &SessionId, tokens: u64) -> Result<Usage> {
        let mut usage = self.get(session).await?;
        usage.record(tokens);
        self.sessions.write().await.insert(*session, usage);
        debug!(%session, tokens, total = usage.tokens, "usage ledger updated");
        Ok(usage)
    }
}
