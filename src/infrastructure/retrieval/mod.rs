//! Retriever gateway implementations

mod qdrant;

pub use qdrant::{QdrantConfig, QdrantGateway};
