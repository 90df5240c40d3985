//! Error taxonomy of the corrective loop

use thiserror::Error;

use crate::domain::DomainError;

/// Failures observed while running one CRAG session
///
/// Only `Retrieval`, `Generation` and `Cancelled` end a session with an error
/// status. Grading and rewrite anomalies are absorbed by the routing policy.
#[derive(Debug, Error)]
pub enum CragError {
    #[error("retrieval failed: {0}")]
    Retrieval(String),

    #[error("grader output could not be parsed: {output:?}")]
    GradingParse { output: String },

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("rewriter produced a degenerate query: {reason}")]
    RewriteDegenerate { reason: String },

    #[error("session cancelled")]
    Cancelled,

    #[error(transparent)]
    Collaborator(#[from] DomainError),
}

impl CragError {
    pub fn grading_parse(output: impl Into<String>) -> Self {
        Self::GradingParse {
            output: output.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    pub fn rewrite_degenerate(reason: impl Into<String>) -> Self {
        Self::RewriteDegenerate {
            reason: reason.into(),
        }
    }
}
