use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use ae_core::{Classification, Error, RelevanceScorer, Result};
use std::fmt;
use crate::Config;

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_MODEL: &str = "facebook/bart-large-mnli";

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
    hypothesis_template: &'a str,
}

#[derive(Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// The hosted pipeline answers either with aligned arrays or with a list of pairs.
#[derive(Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Aligned { labels: Vec<String>, scores: Vec<f64> },
    Pairs(Vec<LabelScore>),
}

impl From<ZeroShotResponse> for Classification {
    fn from(response: ZeroShotResponse) -> Self {
        match response {
            ZeroShotResponse::Aligned { labels, scores } => Classification { labels, scores },
            ZeroShotResponse::Pairs(pairs) => {
                let (labels, scores) = pairs.into_iter().map(|p| (p.label, p.score)).unzip();
                Classification { labels, scores }
            }
        }
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Zero-shot classifier served by the Hugging Face inference API.
pub struct HuggingFaceScorer {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl HuggingFaceScorer {
    pub fn new(config: Config) -> Result<Self> {
        let model = config.model_name.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base = super::base_url(config.base_url.as_deref(), DEFAULT_BASE_URL)?;
        Ok(Self {
            client: Client::new(),
            api_key: config.api_key,
            endpoint: format!("{}/models/{}", base, model),
            model,
        })
    }
}

impl fmt::Debug for HuggingFaceScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuggingFaceScorer")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl RelevanceScorer for HuggingFaceScorer {
    fn name(&self) -> &str {
        "HuggingFace"
    }

    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
        hypothesis_template: &str,
    ) -> Result<Classification> {
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels,
                hypothesis_template,
            },
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Scorer(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::Scorer(e.to_string()))?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| format!("{}: {}", status, body));
            return Err(Error::Scorer(message));
        }

        let parsed: ZeroShotResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Scorer(format!("Unexpected classifier response: {}", e)))?;
        Ok(parsed.into())
    }
}
