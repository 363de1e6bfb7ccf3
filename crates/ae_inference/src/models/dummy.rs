use std::fmt;
use ae_core::{Classification, ContentGenerator, Generation, GenerationRequest, RelevanceScorer, Result};

const BUSINESS_TERMS: &[&str] = &[
    "business", "use case", "customer", "cost", "efficiency", "enterprise",
    "productivity", "revenue", "automation", "strategy", "workflow", "roi",
];

/// Offline scorer that counts business vocabulary instead of calling a model.
pub struct DummyScorer;

impl fmt::Debug for DummyScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyScorer").finish()
    }
}

impl DummyScorer {
    fn relevance(text: &str) -> f64 {
        let text = text.to_lowercase();
        let hits = BUSINESS_TERMS.iter().filter(|term| text.contains(*term)).count() as f64;
        hits / (hits + 2.0)
    }
}

#[async_trait::async_trait]
impl RelevanceScorer for DummyScorer {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
        _hypothesis_template: &str,
    ) -> Result<Classification> {
        // First label gets the keyword score, the rest share what is left.
        let relevant = Self::relevance(text);
        let rest = candidate_labels.len().saturating_sub(1).max(1) as f64;
        let scores = candidate_labels
            .iter()
            .enumerate()
            .map(|(i, _)| if i == 0 { relevant } else { (1.0 - relevant) / rest })
            .collect();
        Ok(Classification {
            labels: candidate_labels.iter().map(|l| l.to_string()).collect(),
            scores,
        })
    }
}

/// Offline generator producing a short placeholder post; one token per word.
pub struct DummyGenerator;

impl fmt::Debug for DummyGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyGenerator").finish()
    }
}

#[async_trait::async_trait]
impl ContentGenerator for DummyGenerator {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<Generation> {
        let headline = request
            .prompt
            .lines()
            .find_map(|line| line.trim().strip_prefix("Title: "))
            .unwrap_or("this article");
        let text = format!("Why {} matters for your business.", headline);
        let prompt_words = request.prompt.split_whitespace().count();
        let text_words = text.split_whitespace().count();
        Ok(Generation {
            text,
            total_tokens: (prompt_words + text_words) as u64,
        })
    }
}
