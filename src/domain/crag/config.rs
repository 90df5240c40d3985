//! CRAG configuration types

use serde::{Deserialize, Serialize};
use validator::Validate;

/// How candidates are labelled relevant or irrelevant
///
/// Both strategies sit behind the same `RelevanceGrader` contract; the
/// controller only ever routes on the binary label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GradingStrategy {
    /// Ask an LLM for a one-token `relevant` / `irrelevant` verdict
    #[default]
    LlmLabel,
    /// Compare the vector similarity score against `relevance_threshold`
    Threshold,
}

/// Configuration for the corrective loop
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CragConfig {
    /// Candidates requested from the retriever per round (K)
    #[serde(default = "default_top_k")]
    #[validate(range(min = 1, max = 20))]
    pub top_k: usize,
    /// Reformulations allowed before declining
    #[serde(default = "default_max_rewrite_attempts")]
    #[validate(range(max = 5))]
    pub max_rewrite_attempts: u32,
    /// Minimum score for the threshold grader to call a candidate relevant
    #[serde(default = "default_relevance_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub relevance_threshold: f32,
    /// Grader implementation to build
    #[serde(default)]
    pub grading_strategy: GradingStrategy,
    /// Grade the candidates of one round concurrently
    #[serde(default = "default_true")]
    pub parallel_grading: bool,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 2.0))]
    pub grader_temperature: f32,
    #[serde(default = "default_rewriter_temperature")]
    #[validate(range(min = 0.0, max = 2.0))]
    pub rewriter_temperature: f32,
    #[serde(default = "default_generator_temperature")]
    #[validate(range(min = 0.0, max = 2.0))]
    pub generator_temperature: f32,
    #[serde(default = "default_grader_max_tokens")]
    pub grader_max_tokens: u32,
    #[serde(default = "default_rewriter_max_tokens")]
    pub rewriter_max_tokens: u32,
    #[serde(default = "default_generator_max_tokens")]
    pub generator_max_tokens: u32,
}

fn default_top_k() -> usize {
    5
}

fn default_max_rewrite_attempts() -> u32 {
    2
}

fn default_relevance_threshold() -> f32 {
    0.6
}

fn default_true() -> bool {
    true
}

fn default_rewriter_temperature() -> f32 {
    0.7
}

fn default_generator_temperature() -> f32 {
    0.3
}

fn default_grader_max_tokens() -> u32 {
    16
}

fn default_rewriter_max_tokens() -> u32 {
    256
}

fn default_generator_max_tokens() -> u32 {
    2048
}

impl Default for CragConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_rewrite_attempts: default_max_rewrite_attempts(),
            relevance_threshold: default_relevance_threshold(),
            grading_strategy: GradingStrategy::default(),
            parallel_grading: default_true(),
            grader_temperature: 0.0,
            rewriter_temperature: default_rewriter_temperature(),
            generator_temperature: default_generator_temperature(),
            grader_max_tokens: default_grader_max_tokens(),
            rewriter_max_tokens: default_rewriter_max_tokens(),
            generator_max_tokens: default_generator_max_tokens(),
        }
    }
}

impl CragConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn with_max_rewrite_attempts(mut self, max: u32) -> Self {
        self.max_rewrite_attempts = max;
        self
    }

    pub fn with_relevance_threshold(mut self, threshold: f32) -> Self {
        self.relevance_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_grading_strategy(mut self, strategy: GradingStrategy) -> Self {
        self.grading_strategy = strategy;
        self
    }

    pub fn with_parallel_grading(mut self, parallel: bool) -> Self {
        self.parallel_grading = parallel;
        self
    }

    /// Upper bound on retrieval rounds for one session
    pub fn max_retrieval_rounds(&self) -> u32 {
        self.max_rewrite_attempts + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CragConfig::default();

        assert_eq!(config.top_k, 5);
        assert_eq!(config.max_rewrite_attempts, 2);
        assert_eq!(config.relevance_threshold, 0.6);
        assert_eq!(config.grading_strategy, GradingStrategy::LlmLabel);
        assert!(config.parallel_grading);
        assert_eq!(config.max_retrieval_rounds(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = CragConfig::new()
            .with_top_k(8)
            .with_max_rewrite_attempts(0)
            .with_relevance_threshold(1.5)
            .with_grading_strategy(GradingStrategy::Threshold)
            .with_parallel_grading(false);

        assert_eq!(config.top_k, 8);
        assert_eq!(config.max_rewrite_attempts, 0);
        assert_eq!(config.relevance_threshold, 1.0);
        assert_eq!(config.grading_strategy, GradingStrategy::Threshold);
        assert!(!config.parallel_grading);
        assert_eq!(config.max_retrieval_rounds(), 1);
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        let mut config = CragConfig::default();
        config.top_k = 50;
        assert!(config.validate().is_err());

        let mut config = CragConfig::default();
        config.max_rewrite_attempts = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: CragConfig =
            serde_json::from_str(r#"{"top_k": 3, "grading_strategy": "threshold"}"#).unwrap();

        assert_eq!(config.top_k, 3);
        assert_eq!(config.grading_strategy, GradingStrategy::Threshold);
        assert_eq!(config.max_rewrite_attempts, 2);
        assert_eq!(config.rewriter_temperature, 0.7);
    }
}
