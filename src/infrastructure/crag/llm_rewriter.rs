//! LLM-based query rewriter

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::prompts;
use crate::domain::crag::{CragConfig, CragError, QueryRewriter};
use crate::domain::llm::{LlmProvider, LlmRequest};

#[derive(Debug)]
pub struct LlmQueryRewriter {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmQueryRewriter {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>, config: &CragConfig) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: config.rewriter_temperature,
            max_tokens: config.rewriter_max_tokens,
        }
    }
}

/// First non-empty line with heading marks and wrapping quotes removed
fn clean_rewrite(output: &str) -> String {
    let line = output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();

    line.trim_start_matches('#')
        .trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '«' | '»' | '*' | '`'))
        .trim()
        .to_string()
}

#[async_trait]
impl QueryRewriter for LlmQueryRewriter {
    async fn rewrite(&self, current: &str, history: &[String]) -> Result<String, CragError> {
        let request = LlmRequest::builder()
            .messages(prompts::rewriter_messages(current, history))
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build();

        let response = self.provider.chat(&self.model, request).await?;
        let rewritten = clean_rewrite(response.content());

        debug!(model = %self.model, rewritten = %rewritten, "Query rewritten");

        Ok(rewritten)
    }

    fn rewriter_name(&self) -> &'static str {
        "llm"
    }
}
