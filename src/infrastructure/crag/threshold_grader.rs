//! Threshold-based relevance grader
//!
//! Labels candidates from their vector similarity score alone; no model call.

use async_trait::async_trait;

use crate::domain::crag::{CragConfig, CragError, Grade, RelevanceGrader, RelevanceLabel};
use crate::domain::retrieval::Candidate;

#[derive(Debug, Clone)]
pub struct ThresholdRelevanceGrader {
    threshold: f32,
}

impl ThresholdRelevanceGrader {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn from_config(config: &CragConfig) -> Self {
        Self::new(config.relevance_threshold)
    }
}

#[async_trait]
impl RelevanceGrader for ThresholdRelevanceGrader {
    async fn grade(&self, _query: &str, candidate: &Candidate) -> Result<Grade, CragError> {
        let label = if candidate.score >= self.threshold {
            RelevanceLabel::Relevant
        } else {
            RelevanceLabel::Irrelevant
        };

        Ok(Grade::new(label).with_confidence(candidate.score))
    }

    fn grader_name(&self) -> &'static str {
        "threshold"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::retrieval::Citation;

    fn candidate(score: f32) -> Candidate {
        Candidate::new("doc", "نص", score, Citation::new("قانون العمل", "1"))
    }

    #[tokio::test]
    async fn test_default_threshold() {
        let grader = ThresholdRelevanceGrader::from_config(&CragConfig::default());

        let above = grader.grade("q", &candidate(0.61)).await.unwrap();
        let at = grader.grade("q", &candidate(0.6)).await.unwrap();
        let below = grader.grade("q", &candidate(0.59)).await.unwrap();

        assert!(above.label.is_relevant());
        assert!(at.label.is_relevant());
        assert!(!below.label.is_relevant());
        assert_eq!(below.confidence, Some(0.59));
    }

    #[tokio::test]
    async fn test_custom_threshold() {
        let grader = ThresholdRelevanceGrader::new(0.85);

        assert!(!grader.grade("q", &candidate(0.8)).await.unwrap().label.is_relevant());
        assert!(grader.grade("q", &candidate(0.9)).await.unwrap().label.is_relevant());
    }

    #[test]
    fn test_grader_name() {
        assert_eq!(ThresholdRelevanceGrader::new(0.5).grader_name(), "threshold");
    }
}
