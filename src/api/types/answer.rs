//! Request body of the answer endpoint

use serde::{Deserialize, Serialize};

/// POST /v1/answer body
///
/// The response body is the serialized `AnswerResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// Legal question in Arabic
    pub query: String,
}
