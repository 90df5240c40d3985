//! Retriever gateway contract

use std::fmt::Debug;

use async_trait::async_trait;

use super::Candidate;
use crate::domain::DomainError;

/// Similarity search against an external vector index
///
/// Implementations return at most `top_k` candidates ordered by descending
/// score. The controller does not retry; any retry policy lives in the
/// implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RetrieverGateway: Send + Sync + Debug {
    /// Search the index. Fails with `DomainError::Retrieval` when the index is
    /// unreachable or times out.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Candidate>, DomainError>;

    /// Check that the index is reachable and the collection exists
    async fn health_check(&self) -> Result<(), DomainError>;

    /// Get the gateway name
    fn gateway_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    pub use super::MockRetrieverGateway;

    /// Retriever that replays one scripted result per round
    ///
    /// Once the script is exhausted every further round returns an empty set.
    #[derive(Debug, Default)]
    pub struct ScriptedRetriever {
        rounds: Mutex<VecDeque<Result<Vec<Candidate>, String>>>,
        queries: Mutex<Vec<(String, usize)>>,
    }

    impl ScriptedRetriever {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_round(self, candidates: Vec<Candidate>) -> Self {
            self.rounds.lock().unwrap().push_back(Ok(candidates));
            self
        }

        pub fn with_failure(self, message: impl Into<String>) -> Self {
            self.rounds.lock().unwrap().push_back(Err(message.into()));
            self
        }

        /// Queries received so far, with the requested `top_k`
        pub fn queries(&self) -> Vec<(String, usize)> {
            self.queries.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.queries.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RetrieverGateway for ScriptedRetriever {
        async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Candidate>, DomainError> {
            self.queries.lock().unwrap().push((query.to_string(), top_k));

            match self.rounds.lock().unwrap().pop_front() {
                Some(Ok(candidates)) => Ok(candidates.into_iter().take(top_k).collect()),
                Some(Err(message)) => Err(DomainError::retrieval(message)),
                None => Ok(Vec::new()),
            }
        }

        async fn health_check(&self) -> Result<(), DomainError> {
            Ok(())
        }

        fn gateway_name(&self) -> &'static str {
            "scripted"
        }
    }
}
