//! Retrieval domain - legal passages returned by the vector index

mod candidate;
mod gateway;

pub use candidate::{Candidate, Citation};
pub use gateway::RetrieverGateway;

#[cfg(test)]
pub use gateway::mock::{MockRetrieverGateway, ScriptedRetriever};
