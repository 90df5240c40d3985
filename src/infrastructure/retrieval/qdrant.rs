//! Qdrant retriever gateway over the REST API

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest};
use crate::domain::retrieval::{Candidate, Citation, RetrieverGateway};
use crate::domain::DomainError;
use crate::infrastructure::llm::HttpClientTrait;

/// Connection and embedding settings for one Qdrant collection
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    /// Model name sent to the embedding provider
    pub embedding_model: String,
    /// Prepended to every query before embedding (E5 models expect `query: `)
    pub query_prefix: String,
}

impl QdrantConfig {
    pub fn new(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            api_key: None,
            collection: collection.into(),
            embedding_model: "intfloat/multilingual-e5-large".to_string(),
            query_prefix: "query: ".to_string(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.is_empty()).then_some(api_key);
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_query_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.query_prefix = prefix.into();
        self
    }
}

/// Dense-vector search against Qdrant
///
/// The embedding provider is shared with the rest of the process and is
/// never rebuilt per query.
#[derive(Debug)]
pub struct QdrantGateway<C: HttpClientTrait> {
    client: C,
    embedder: Arc<dyn EmbeddingProvider>,
    config: QdrantConfig,
}

impl<C: HttpClientTrait> QdrantGateway<C> {
    pub fn new(client: C, embedder: Arc<dyn EmbeddingProvider>, config: QdrantConfig) -> Self {
        Self {
            client,
            embedder,
            config,
        }
    }

    fn search_url(&self) -> String {
        format!(
            "{}/collections/{}/points/search",
            self.config.url, self.config.collection
        )
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.config.url, self.config.collection)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(ref key) = self.config.api_key {
            headers.push(("api-key", key.as_str()));
        }
        headers
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError> {
        let input = format!("{}{}", self.config.query_prefix, query);
        let response = self
            .embedder
            .embed(EmbeddingRequest::single(&self.config.embedding_model, input))
            .await
            .map_err(|e| DomainError::retrieval(format!("Query embedding failed: {}", e)))?;

        response
            .into_first_vector()
            .ok_or_else(|| DomainError::retrieval("Embedding provider returned no vector"))
    }

    fn parse_results(&self, json: serde_json::Value) -> Result<Vec<Candidate>, DomainError> {
        let response: QdrantSearchResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::retrieval(format!("Unexpected Qdrant response: {}", e))
        })?;

        Ok(response.result.into_iter().map(QdrantPoint::into_candidate).collect())
    }
}

#[async_trait]
impl<C: HttpClientTrait> RetrieverGateway for QdrantGateway<C> {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Candidate>, DomainError> {
        let vector = self.embed_query(query).await?;

        let body = serde_json::json!({
            "vector": vector,
            "limit": top_k,
            "with_payload": true,
        });

        let response = self
            .client
            .post_json(&self.search_url(), self.headers(), &body)
            .await
            .map_err(|e| DomainError::retrieval(format!("Qdrant search failed: {}", e)))?;

        let mut candidates = self.parse_results(response)?;
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(top_k);

        debug!(
            collection = %self.config.collection,
            top_k,
            returned = candidates.len(),
            "Qdrant search completed"
        );

        Ok(candidates)
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        self.client
            .get_json(&self.collection_url(), self.headers())
            .await
            .map(|_| ())
            .map_err(|e| DomainError::retrieval(format!("Qdrant collection unavailable: {}", e)))
    }

    fn gateway_name(&self) -> &'static str {
        "qdrant"
    }
}

// Qdrant REST types

#[derive(Debug, Deserialize)]
struct QdrantSearchResponse {
    result: Vec<QdrantPoint>,
}

#[derive(Debug, Deserialize)]
struct QdrantPoint {
    id: serde_json::Value,
    score: f32,
    #[serde(default)]
    payload: serde_json::Map<String, serde_json::Value>,
}

/// Payload values are written by different ingestion scripts, so numbers and
/// strings are both accepted.
fn payload_string(
    payload: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Option<String> {
    match payload.get(key)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl QdrantPoint {
    fn into_candidate(self) -> Candidate {
        let id = match self.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };

        let text = payload_string(&self.payload, "text").unwrap_or_default();
        let source_name = payload_string(&self.payload, "source_name")
            .unwrap_or_else(|| "غير معروف".to_string());
        let article_ref = payload_string(&self.payload, "article_number")
            .unwrap_or_else(|| "غير محدد".to_string());

        let mut citation = Citation::new(source_name, article_ref);
        if let Some(year) = payload_string(&self.payload, "law_year").and_then(|y| y.parse().ok()) {
            citation = citation.with_year(year);
        }
        if let Some(number) = payload_string(&self.payload, "law_number") {
            citation = citation.with_law_number(number);
        }

        Candidate::new(id, text, self.score, citation)
    }
}
