use std::fmt;
use std::str::FromStr;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::{Error, Result};

/// Blended price per generated token, in dollars ($0.00175 per 1000 tokens).
pub const COST_PER_TOKEN: f64 = 0.00175 / 1000.0;

/// Identifies one browser (or CLI) session owning a usage ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| Error::Config(format!("Invalid session id: {}", e)))
    }
}

/// Running token and cost totals for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub tokens: u64,
    pub cost: f64,
}

impl Usage {
    pub fn record(&mut self, tokens: u64) {
        self.tokens += tokens;
        self.cost += tokens as f64 * COST_PER_TOKEN;
    }
}

#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// Current totals, zero for a session never seen before
    async fn get(&self, session: &SessionId) -> Result<Usage>;

    /// Add `tokens` (and their cost) to the session's totals and return the new totals
    async fn update(&self, session: &SessionId, tokens: u64) -> Result<Usage>;
}
