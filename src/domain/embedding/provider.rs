//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use super::{EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;

/// Trait for embedding providers
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate embeddings for the given input
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::embedding::{Embedding, EmbeddingUsage};

    #[derive(Debug)]
    pub struct MockEmbeddingProvider {
        dimensions: usize,
        error: Option<String>,
    }

    impl MockEmbeddingProvider {
        pub fn new(dimensions: usize) -> Self {
            Self {
                dimensions,
                error: None,
            }
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
            if let Some(ref error) = self.error {
                return Err(DomainError::provider("mock_embedding", error));
            }

            let embeddings: Vec<Embedding> = request
                .inputs()
                .iter()
                .enumerate()
                .map(|(idx, text)| {
                    // Deterministic vector derived from the text bytes
                    let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_add(b as u64));
                    let vector: Vec<f32> = (0..self.dimensions)
                        .map(|i| ((hash.wrapping_add(i as u64) % 1000) as f32 / 1000.0) - 0.5)
                        .collect();

                    Embedding::new(idx, vector)
                })
                .collect();

            Ok(EmbeddingResponse::new(
                request.model().to_string(),
                embeddings,
                EmbeddingUsage::default(),
            ))
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_provider_is_deterministic() {
            let provider = MockEmbeddingProvider::new(16);

            let first = provider
                .embed(EmbeddingRequest::single("e5", "query: الملكية"))
                .await
                .unwrap();
            let second = provider
                .embed(EmbeddingRequest::single("e5", "query: الملكية"))
                .await
                .unwrap();

            assert_eq!(first.embeddings()[0].vector(), second.embeddings()[0].vector());
            assert_eq!(first.embeddings()[0].dimensions(), 16);
        }

        #[tokio::test]
        async fn test_mock_provider_error() {
            let provider = MockEmbeddingProvider::new(16).with_error("model not loaded");

            let result = provider.embed(EmbeddingRequest::single("e5", "x")).await;

            assert!(result.is_err());
        }
    }
}
