//! Domain layer - Core types and collaborator contracts

pub mod crag;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod retrieval;

pub use error::DomainError;
pub use llm::{FinishReason, LlmProvider, LlmRequest, LlmResponse, Message};
