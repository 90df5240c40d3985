//! Grounded answer generation contract

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::CragError;
use crate::domain::retrieval::{Candidate, Citation};

/// Answer text plus the citations it is grounded on
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAnswer {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl GeneratedAnswer {
    pub fn new(text: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            text: text.into(),
            citations,
        }
    }
}

/// Writes an answer from relevant passages only
#[async_trait]
pub trait AnswerGenerator: Send + Sync + Debug {
    /// Generate an answer for `query` grounded in `context`, which holds only
    /// candidates graded relevant and is never empty.
    async fn generate(
        &self,
        query: &str,
        context: &[Arc<Candidate>],
    ) -> Result<GeneratedAnswer, CragError>;

    /// Get the generator name
    fn generator_name(&self) -> &'static str;
}

static CITATION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\s*([0-9\u{0660}-\u{0669}]+(?:\s*[,\u{060C}]\s*[0-9\u{0660}-\u{0669}]+)*)\s*\]")
        .expect("citation marker pattern is valid")
});

fn parse_marker(digits: &str) -> Option<usize> {
    let ascii: String = digits
        .chars()
        .map(|c| match c {
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            other => other,
        })
        .collect();
    ascii.parse().ok()
}

/// Resolve `[n]` markers in generated text against a 1-based context list
///
/// A marker may group several indices, `[1, 2]` or `[1، 2]`, and may use
/// Western or Arabic-Indic digits. Out-of-range markers are
/// ignored and each citation appears once, in order of first mention.
pub fn bind_citations(text: &str, context: &[Arc<Candidate>]) -> Vec<Citation> {
    let mut citations: Vec<Citation> = Vec::new();

    let indices = CITATION_MARKER
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .flat_map(|group| group.as_str().split([',', '\u{060C}']))
        .filter_map(|digits| parse_marker(digits.trim()));

    for index in indices {
        if index == 0 || index > context.len() {
            continue;
        }
        let citation = &context[index - 1].citation;
        if !citations.contains(citation) {
            citations.push(citation.clone());
        }
    }

    citations
}

#[cfg(test)]
pub mod mock {
    use std::sync::Mutex;

    use super::*;

    /// Generator that cites every passage it is handed
    #[derive(Debug, Default)]
    pub struct MockAnswerGenerator {
        error: Option<String>,
        uncited: bool,
        extra: Vec<Citation>,
        empty: bool,
        contexts: Mutex<Vec<Vec<String>>>,
    }

    impl MockAnswerGenerator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_error(mut self, message: impl Into<String>) -> Self {
            self.error = Some(message.into());
            self
        }

        /// Return answer text without any citation
        pub fn without_citations(mut self) -> Self {
            self.uncited = true;
            self
        }

        /// Also cite `citation`, whether or not any passage backs it
        pub fn with_citation(mut self, citation: Citation) -> Self {
            self.extra.push(citation);
            self
        }

        /// Return blank answer text
        pub fn with_empty_answer(mut self) -> Self {
            self.empty = true;
            self
        }

        /// Candidate ids of each context received, in call order
        pub fn contexts(&self) -> Vec<Vec<String>> {
            self.contexts.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.contexts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AnswerGenerator for MockAnswerGenerator {
        async fn generate(
            &self,
            query: &str,
            context: &[Arc<Candidate>],
        ) -> Result<GeneratedAnswer, CragError> {
            self.contexts
                .lock()
                .unwrap()
                .push(context.iter().map(|c| c.id.clone()).collect());

            if let Some(ref error) = self.error {
                return Err(CragError::generation(error.clone()));
            }

            let mut citations: Vec<Citation> = if self.uncited {
                Vec::new()
            } else {
                context.iter().map(|c| c.citation.clone()).collect()
            };
            citations.extend(self.extra.iter().cloned());

            let text = if self.empty {
                String::new()
            } else {
                format!("إجابة: {}", query)
            };

            Ok(GeneratedAnswer::new(text, citations))
        }

        fn generator_name(&self) -> &'static str {
            "mock"
        }
    }
}
