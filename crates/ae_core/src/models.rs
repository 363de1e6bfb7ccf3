use std::fmt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::Result;

/// Output of a zero-shot classification call. `labels` and `scores` are aligned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl Classification {
    /// Probability assigned to `label`, if the classifier returned it.
    pub fn score_for(&self, label: &str) -> Option<f64> {
        self.labels
            .iter()
            .position(|l| l == label)
            .and_then(|i| self.scores.get(i).copied())
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    pub credential: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub total_tokens: u64,
}

#[async_trait]
pub trait RelevanceScorer: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Classify `text` against `candidate_labels` using `hypothesis_template`
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
        hypothesis_template: &str,
    ) -> Result<Classification>;
}

#[async_trait]
pub trait ContentGenerator: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Run one chargeable completion. The credential is used for this call only.
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<Generation>;
}
