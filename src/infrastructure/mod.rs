//! Infrastructure layer - External service implementations

pub mod crag;
pub mod embedding;
pub mod llm;
pub mod logging;
pub mod observability;
pub mod retrieval;
