//! LLM-based answer generator

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::prompts;
use crate::domain::crag::{bind_citations, AnswerGenerator, CragConfig, CragError, GeneratedAnswer};
use crate::domain::llm::{FinishReason, LlmProvider, LlmRequest};
use crate::domain::retrieval::Candidate;

#[derive(Debug)]
pub struct LlmAnswerGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmAnswerGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>, config: &CragConfig) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: config.generator_temperature,
            max_tokens: config.generator_max_tokens,
        }
    }
}

#[async_trait]
impl AnswerGenerator for LlmAnswerGenerator {
    async fn generate(
        &self,
        query: &str,
        context: &[Arc<Candidate>],
    ) -> Result<GeneratedAnswer, CragError> {
        if context.is_empty() {
            return Err(CragError::generation("no relevant passages to answer from"));
        }

        let request = LlmRequest::builder()
            .messages(prompts::generator_messages(query, context))
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build();

        let response = self
            .provider
            .chat(&self.model, request)
            .await
            .map_err(|e| CragError::generation(e.to_string()))?;

        if response.finish_reason == Some(FinishReason::ContentFilter) {
            return Err(CragError::generation("model output was filtered"));
        }

        if response.is_truncated() {
            warn!(
                model = %self.model,
                max_tokens = self.max_tokens,
                "Answer cut off at max_tokens"
            );
        }

        let text = response.content().trim();
        if text.is_empty() {
            return Err(CragError::generation("model returned an empty answer"));
        }

        let citations = bind_citations(text, context);
        if citations.is_empty() {
            return Err(CragError::generation(
                "answer does not cite any of the provided passages",
            ));
        }

        debug!(
            model = %self.model,
            context = context.len(),
            citations = citations.len(),
            "Answer generated"
        );

        Ok(GeneratedAnswer::new(text, citations))
    }

    fn generator_name(&self) -> &'static str {
        "llm"
    }
}
