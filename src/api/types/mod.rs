//! HTTP request and response types

pub mod answer;
pub mod error;
pub mod json;

pub use answer::AnswerRequest;
pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
