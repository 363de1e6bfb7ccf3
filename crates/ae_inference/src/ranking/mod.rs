use std::fmt;
use std::sync::Arc;
use ae_core::{Article, Error, RelevanceScorer, Result};
use tracing::{debug, info};

pub const RELEVANT_LABEL: &str = "relevant";
pub const NOT_RELEVANT_LABEL: &str = "not relevant";
pub const CANDIDATE_LABELS: [&str; 2] = [RELEVANT_LABEL, NOT_RELEVANT_LABEL];

/// Rubric the classifier tests each label against; `{}` is replaced by the label.
pub const HYPOTHESIS_TEMPLATE: &str =
    "This article is relevant to business users because it discusses a use case with practical value... {}";

#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// When false the store's scores and order are used as-is.
    pub compute_scores: bool,
    /// Score every article on each load, not only those without a score.
    pub rescore_existing: bool,
    pub batch_size: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            compute_scores: true,
            rescore_existing: false,
            batch_size: 10,
        }
    }
}

pub struct RelevanceRanker {
    scorer: Arc<dyn RelevanceScorer>,
    config: ScoringConfig,
}

impl fmt::Debug for RelevanceRanker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelevanceRanker")
            .field("scorer", &self.scorer.name())
            .field("config", &self.config)
            .finish()
    }
}

impl RelevanceRanker {
    pub fn new(scorer: Arc<dyn RelevanceScorer>, config: ScoringConfig) -> Self {
        Self { scorer, config }
    }

    /// Probability that `article` is relevant under the business rubric.
    pub async fn score_article(&self, article: &Article) -> Result<f64> {
        let classification = self
            .scorer
            .classify(&article.classification_text(), &CANDIDATE_LABELS, HYPOTHESIS_TEMPLATE)
            .await?;
        let score = classification.score_for(RELEVANT_LABEL).ok_or_else(|| {
            Error::Scorer(format!("Classifier returned no \"{}\" label", RELEVANT_LABEL))
        })?;
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(Error::Scorer(format!("Relevance score {} is not a probability", score)));
        }
        Ok(score)
    }

    /// Fill in missing scores and sort by score descending, keeping input order for ties.
    /// Any scorer failure aborts the whole ranking.
    pub async fn rank(&self, mut articles: Vec<Article>) -> Result<Vec<Article>> {
        if !self.config.compute_scores {
            return Ok(articles);
        }

        let batch_size = self.config.batch_size.max(1);
        let mut scored = 0usize;
        for (batch, chunk) in articles.chunks_mut(batch_size).enumerate() {
            debug!(batch, size = chunk.len(), "scoring batch");
            for article in chunk.iter_mut() {
                if article.score.is_some() && !self.config.rescore_existing {
                    continue;
                }
                let score = self.score_article(article).await?;
                debug!(link = %article.link, score, "scored article");
                article.score = Some(score);
                scored += 1;
            }
        }
        if scored > 0 {
            info!("🧠 Scored {} of {} articles (using {})", scored, articles.len(), self.scorer.name());
        }

        articles.sort_by(Article::cmp_by_score_desc);
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ae_core::Classification;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    /// Scores by exact classification text and counts calls.
    #[derive(Debug, Default)]
    struct TableScorer {
        scores: HashMap<String, f64>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl TableScorer {
        fn new(entries: &[(&Article, f64)]) -> Self {
            Self {
                scores: entries
                    .iter()
                    .map(|(article, score)| (article.classification_text(), *score))
                    .collect(),
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(AtomicOrdering::SeqCst)
        }
    }

    #[async_trait]
    impl RelevanceScorer for TableScorer {
        fn name(&self) -> &str {
            "Table"
        }

        async fn classify(&self, text: &str, labels: &[&str], template: &str) -> Result<Classification> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            if self.fail {
                return Err(Error::Scorer("model unavailable".to_string()));
            }
            assert_eq!(labels, &CANDIDATE_LABELS);
            assert_eq!(template, HYPOTHESIS_TEMPLATE);
            let score = self.scores.get(text).copied().unwrap_or(0.5);
            Ok(Classification {
                labels: vec![NOT_RELEVANT_LABEL.to_string(), RELEVANT_LABEL.to_string()],
                scores: vec![1.0 - score, score],
            })
        }
    }

    fn catalog() -> Vec<Article> {
        vec![
            Article::new("A", "l1", "s1"),
            Article::new("B", "l2", "s2"),
            Article::new("C", "l3", "s3"),
            Article::new("D", "l4", "s4"),
        ]
    }

    fn links(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.link.as_str()).collect()
    }

    #[tokio::test]
    async fn test_rank_sorts_descending_and_keeps_ties_stable() {
        let articles = catalog();
        let scorer = Arc::new(TableScorer::new(&[
            (&articles[0], 0.2),
            (&articles[1], 0.7),
            (&articles[2], 0.2),
            (&articles[3], 0.9),
        ]));
        let ranker = RelevanceRanker::new(scorer.clone(), ScoringConfig { batch_size: 3, ..Default::default() });

        let ranked = ranker.rank(articles).await.unwrap();
        assert_eq!(links(&ranked), vec!["l4", "l2", "l1", "l3"]);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(scorer.calls(), 4);
    }

    #[tokio::test]
    async fn test_rank_without_compute_leaves_catalog_untouched() {
        let articles = vec![
            Article::new("A", "l1", "s1").with_score(0.3),
            Article::new("B", "l2", "s2").with_score(0.8),
        ];
        let scorer = Arc::new(TableScorer::default());
        let ranker = RelevanceRanker::new(
            scorer.clone(),
            ScoringConfig { compute_scores: false, ..Default::default() },
        );

        let ranked = ranker.rank(articles.clone()).await.unwrap();
        assert_eq!(ranked, articles);
        assert_eq!(scorer.calls(), 0);
    }

    #[tokio::test]
    async fn test_rank_only_scores_missing() {
        let mut articles = catalog();
        articles[0].score = Some(0.1);
        let scorer = Arc::new(TableScorer::new(&[(&articles[1], 0.6)]));
        let ranker = RelevanceRanker::new(scorer.clone(), ScoringConfig::default());

        let ranked = ranker.rank(articles).await.unwrap();
        assert_eq!(scorer.calls(), 3);
        assert_eq!(ranked.last().unwrap().link, "l1");
        assert_eq!(ranked.last().unwrap().score, Some(0.1));
    }

    #[tokio::test]
    async fn test_rank_rescores_existing_when_configured() {
        let mut articles = catalog();
        articles[0].score = Some(0.1);
        let scorer = Arc::new(TableScorer::new(&[(&articles[0], 0.95)]));
        let ranker = RelevanceRanker::new(
            scorer.clone(),
            ScoringConfig { rescore_existing: true, ..Default::default() },
        );

        let ranked = ranker.rank(articles).await.unwrap();
        assert_eq!(scorer.calls(), 4);
        assert_eq!(ranked[0].link, "l1");
        assert_eq!(ranked[0].score, Some(0.95));
    }

    #[tokio::test]
    async fn test_rank_fails_fast_on_scorer_error() {
        let scorer = Arc::new(TableScorer { fail: true, ..TableScorer::default() });
        let ranker = RelevanceRanker::new(scorer.clone(), ScoringConfig::default());

        let err = ranker.rank(catalog()).await.unwrap_err();
        assert!(matches!(err, Error::Scorer(_)));
        assert_eq!(scorer.calls(), 1);
    }

    #[tokio::test]
    async fn test_score_out_of_range_is_rejected() {
        let articles = catalog();
        let scorer = Arc::new(TableScorer::new(&[(&articles[0], 1.5)]));
        let ranker = RelevanceRanker::new(scorer, ScoringConfig::default());

        let err = ranker.score_article(&articles[0]).await.unwrap_err();
        assert!(matches!(err, Error::Scorer(_)));
    }
}
