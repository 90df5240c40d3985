//! Embedding provider domain models and traits
//!
//! The embedding provider is a process-wide handle: it is built once at start-up
//! and shared by the retriever gateway through an `Arc`.

mod provider;
mod request;
mod response;

pub use provider::EmbeddingProvider;
pub use request::EmbeddingRequest;
pub use response::{Embedding, EmbeddingResponse, EmbeddingUsage};

#[cfg(test)]
pub use provider::mock::MockEmbeddingProvider;
