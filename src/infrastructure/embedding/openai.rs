//! OpenAI-compatible embedding provider
//!
//! Talks to any server exposing `/v1/embeddings` (Ollama, text-embeddings-inference,
//! infinity), which is how the multilingual E5 model is served.

use async_trait::async_trait;
use serde::Deserialize;

use super::HttpClientTrait;
use crate::domain::embedding::{
    Embedding, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, EmbeddingUsage,
};
use crate::domain::DomainError;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: Option<String>,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_BASE_URL)
    }

    /// Create a new provider with custom base URL
    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let api_key = api_key.into();
        let auth_header = (!api_key.is_empty()).then(|| format!("Bearer {}", api_key));
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
        }
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(ref auth) = self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }
        headers
    }

    fn build_request(&self, request: &EmbeddingRequest) -> serde_json::Value {
        serde_json::json!({
            "model": request.model(),
            "input": request.inputs(),
        })
    }

    fn parse_response(
        &self,
        json: serde_json::Value,
        expected: usize,
    ) -> Result<EmbeddingResponse, DomainError> {
        let response: OpenAiEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse embedding response: {}", e))
        })?;

        if response.data.len() != expected {
            return Err(DomainError::provider(
                "openai",
                format!(
                    "Expected {} embeddings, got {}",
                    expected,
                    response.data.len()
                ),
            ));
        }

        let mut embeddings: Vec<Embedding> = response
            .data
            .into_iter()
            .map(|d| Embedding::new(d.index, d.embedding))
            .collect();
        embeddings.sort_by_key(|e| e.index());

        let usage = response
            .usage
            .map(|u| EmbeddingUsage::new(u.prompt_tokens, u.total_tokens))
            .unwrap_or_default();

        Ok(EmbeddingResponse::new(response.model, embeddings, usage))
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        if request.is_empty() {
            return Err(DomainError::validation("Embedding request has no input"));
        }

        let url = self.embeddings_url();
        let body = self.build_request(&request);

        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await?;

        self.parse_response(response, request.inputs().len())
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    #[serde(default)]
    model: String,
    data: Vec<OpenAiEmbeddingData>,
    usage: Option<OpenAiEmbeddingUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::MockHttpClient;

    const TEST_URL: &str = "http://localhost:11434/v1/embeddings";
    const MODEL: &str = "intfloat/multilingual-e5-large";

    fn create_mock_response(num_embeddings: usize, dimensions: usize) -> serde_json::Value {
        let data: Vec<serde_json::Value> = (0..num_embeddings)
            .rev()
            .map(|i| {
                let embedding: Vec<f32> = (0..dimensions).map(|j| (i + j) as f32 * 0.001).collect();
                serde_json::json!({
                    "index": i,
                    "embedding": embedding,
                    "object": "embedding"
                })
            })
            .collect();

        serde_json::json!({
            "model": MODEL,
            "data": data,
            "usage": {
                "prompt_tokens": 10,
                "total_tokens": 10
            }
        })
    }

    #[tokio::test]
    async fn test_embed_single_text() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(1, 1024));
        let provider = OpenAiEmbeddingProvider::new(client, "");

        let request = EmbeddingRequest::single(MODEL, "query: عقوبة السرقة");
        let response = provider.embed(request).await.unwrap();

        assert_eq!(response.model(), MODEL);
        assert_eq!(response.embeddings().len(), 1);
        assert_eq!(response.embeddings()[0].dimensions(), 1024);
        assert_eq!(response.usage().prompt_tokens(), 10);

        let recorded = provider.client.requests();
        assert_eq!(recorded[0].body.as_ref().unwrap()["input"][0], "query: عقوبة السرقة");
        assert!(recorded[0].header("Authorization").is_none());
    }

    #[tokio::test]
    async fn test_embed_batch_is_ordered_by_index() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(3, 8));
        let provider = OpenAiEmbeddingProvider::new(client, "key");

        let request = EmbeddingRequest::batch(
            MODEL,
            vec!["passage: a".into(), "passage: b".into(), "passage: c".into()],
        );
        let response = provider.embed(request).await.unwrap();

        for (i, emb) in response.embeddings().iter().enumerate() {
            assert_eq!(emb.index(), i);
        }
    }

    #[tokio::test]
    async fn test_missing_usage_is_tolerated() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            serde_json::json!({"data": [{"index": 0, "embedding": [0.1, 0.2]}]}),
        );
        let provider = OpenAiEmbeddingProvider::new(client, "");

        let response = provider
            .embed(EmbeddingRequest::single(MODEL, "query: x"))
            .await
            .unwrap();

        assert_eq!(response.usage().total_tokens(), 0);
    }

    #[tokio::test]
    async fn test_count_mismatch_is_an_error() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(1, 4));
        let provider = OpenAiEmbeddingProvider::new(client, "");

        let request = EmbeddingRequest::batch(MODEL, vec!["a".into(), "b".into()]);
        assert!(provider.embed(request).await.is_err());
    }

    #[tokio::test]
    async fn test_embed_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "model not found");
        let provider = OpenAiEmbeddingProvider::new(client, "");

        let result = provider.embed(EmbeddingRequest::single(MODEL, "Hello")).await;

        assert!(result.is_err());
    }
}
