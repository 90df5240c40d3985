//! LLM-based relevance grader
//!
//! Asks a small, fast model for a one-token `relevant` / `irrelevant` verdict.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::prompts;
use crate::domain::crag::{parse_label, CragConfig, CragError, Grade, RelevanceGrader};
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::retrieval::Candidate;

#[derive(Debug)]
pub struct LlmRelevanceGrader {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmRelevanceGrader {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>, config: &CragConfig) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: config.grader_temperature,
            max_tokens: config.grader_max_tokens,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self::new(provider, model, &CragConfig::default())
    }
}

#[async_trait]
impl RelevanceGrader for LlmRelevanceGrader {
    async fn grade(&self, query: &str, candidate: &Candidate) -> Result<Grade, CragError> {
        let request = LlmRequest::builder()
            .messages(prompts::grader_messages(query, candidate))
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build();

        let response = self.provider.chat(&self.model, request).await?;
        let label = parse_label(response.content())?;

        debug!(
            candidate_id = %candidate.id,
            label = label.as_str(),
            model = %self.model,
            "Candidate graded"
        );

        Ok(Grade::new(label))
    }

    fn grader_name(&self) -> &'static str {
        "llm_label"
    }
}
