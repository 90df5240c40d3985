/// How a completion ended
///
/// Only the endings a CRAG stage reacts to are modelled; anything else a
/// backend reports is kept as `None` on the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    /// Cut off at `max_tokens`
    Length,
    /// Withheld by the backend's moderation
    ContentFilter,
}

impl FinishReason {
    pub fn from_wire(reason: &str) -> Option<Self> {
        match reason {
            "stop" | "eos" => Some(Self::Stop),
            "length" => Some(Self::Length),
            "content_filter" => Some(Self::ContentFilter),
            _ => None,
        }
    }
}

/// Text of the first completion choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmResponse {
    pub model: String,
    text: String,
    pub finish_reason: Option<FinishReason>,
}

impl LlmResponse {
    pub fn new(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            text: text.into(),
            finish_reason: None,
        }
    }

    pub fn with_finish_reason(mut self, reason: Option<FinishReason>) -> Self {
        self.finish_reason = reason;
        self
    }

    pub fn content(&self) -> &str {
        &self.text
    }

    pub fn is_truncated(&self) -> bool {
        self.finish_reason == Some(FinishReason::Length)
    }
}
