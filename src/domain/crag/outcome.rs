//! Session outcome returned to callers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CragError;
use crate::domain::retrieval::Citation;

/// Fixed refusal returned when no relevant passage was found
pub const DECLINE_MESSAGE: &str =
    "عذراً، لم أتمكن من العثور على نصوص قانونية ذات صلة بسؤالك في قاعدة البيانات المتاحة. \
     يرجى إعادة صياغة السؤال أو استشارة محامٍ مختص.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnswerStatus {
    Answered,
    Declined,
    Error,
}

impl AnswerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Answered => "answered",
            Self::Declined => "declined",
            Self::Error => "error",
        }
    }
}

/// Category of a session-ending failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Retrieval,
    Generation,
    Cancelled,
    InvalidQuery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorDetail {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidQuery, message)
    }
}

impl From<&CragError> for ErrorDetail {
    fn from(error: &CragError) -> Self {
        let kind = match error {
            CragError::Retrieval(_) => ErrorKind::Retrieval,
            CragError::Cancelled => ErrorKind::Cancelled,
            CragError::Collaborator(e) if e.is_retrieval() => ErrorKind::Retrieval,
            _ => ErrorKind::Generation,
        };
        Self::new(kind, error.to_string())
    }
}

/// What happened during a session, for logs and API consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTrace {
    pub session_id: Uuid,
    pub retrieval_rounds: u32,
    pub rewrite_attempts: u32,
    /// Every query sent to the retriever, original first
    pub query_history: Vec<String>,
}

impl SessionTrace {
    /// Trace of a session that never reached the retriever
    pub fn empty(session_id: Uuid) -> Self {
        Self {
            session_id,
            retrieval_rounds: 0,
            rewrite_attempts: 0,
            query_history: Vec::new(),
        }
    }
}

/// Result of answering one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub status: AnswerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<ErrorDetail>,
    pub trace: SessionTrace,
}

impl AnswerResult {
    pub fn answered(text: impl Into<String>, citations: Vec<Citation>, trace: SessionTrace) -> Self {
        Self {
            status: AnswerStatus::Answered,
            answer_text: Some(text.into()),
            citations,
            error_detail: None,
            trace,
        }
    }

    /// Declined sessions carry the fixed refusal text and no citations
    pub fn declined(trace: SessionTrace) -> Self {
        Self {
            status: AnswerStatus::Declined,
            answer_text: Some(DECLINE_MESSAGE.to_string()),
            citations: Vec::new(),
            error_detail: None,
            trace,
        }
    }

    pub fn error(detail: ErrorDetail, trace: SessionTrace) -> Self {
        Self {
            status: AnswerStatus::Error,
            answer_text: None,
            citations: Vec::new(),
            error_detail: Some(detail),
            trace,
        }
    }

    pub fn is_answered(&self) -> bool {
        self.status == AnswerStatus::Answered
    }
}
