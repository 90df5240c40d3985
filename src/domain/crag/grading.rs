//! Relevance grading contract and label parsing

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::CragError;
use crate::domain::retrieval::Candidate;

/// Binary relevance verdict for one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelevanceLabel {
    Relevant,
    Irrelevant,
}

impl RelevanceLabel {
    pub fn is_relevant(&self) -> bool {
        matches!(self, Self::Relevant)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevant => "relevant",
            Self::Irrelevant => "irrelevant",
        }
    }
}

/// What a grader returns for one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grade {
    pub label: RelevanceLabel,
    /// Grader confidence in `[0, 1]`, when the grader has one
    pub confidence: Option<f32>,
}

impl Grade {
    pub fn new(label: RelevanceLabel) -> Self {
        Self {
            label,
            confidence: None,
        }
    }

    pub fn relevant() -> Self {
        Self::new(RelevanceLabel::Relevant)
    }

    pub fn irrelevant() -> Self {
        Self::new(RelevanceLabel::Irrelevant)
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }
}

/// A candidate with its label attached
///
/// Holds the candidate by reference; grading never alters the passage.
#[derive(Debug, Clone)]
pub struct GradedCandidate {
    pub candidate: Arc<Candidate>,
    pub label: RelevanceLabel,
    pub confidence: Option<f32>,
    /// Set when the grader failed and the label fell back to irrelevant
    pub degraded: bool,
}

impl GradedCandidate {
    pub fn new(candidate: Arc<Candidate>, grade: Grade) -> Self {
        Self {
            candidate,
            label: grade.label,
            confidence: grade.confidence,
            degraded: false,
        }
    }

    /// Irrelevant label recorded in place of a failed grade
    pub fn degraded(candidate: Arc<Candidate>) -> Self {
        Self {
            candidate,
            label: RelevanceLabel::Irrelevant,
            confidence: None,
            degraded: true,
        }
    }

    pub fn is_relevant(&self) -> bool {
        self.label.is_relevant()
    }
}

/// Classifies a candidate's relevance to the current query
#[async_trait]
pub trait RelevanceGrader: Send + Sync + Debug {
    /// Grade one candidate. Any error is treated by the controller as an
    /// irrelevant verdict for that candidate only.
    async fn grade(&self, query: &str, candidate: &Candidate) -> Result<Grade, CragError>;

    /// Get the grader name
    fn grader_name(&self) -> &'static str;
}

const IRRELEVANT_MARKERS: &[&str] = &[
    "irrelevant",
    "not relevant",
    "غير ذي صلة",
    "غير ذات صلة",
    "غير مرتبط",
    "غير متعلق",
    "لا صلة",
    "لا علاقة",
];

/// Whole-word negations that flip a positive marker later in the reply
const NEGATIONS: &[&str] = &[
    "not", "no", "isn't", "ليس", "ليست", "وليس", "وليست", "لا", "ولا", "لم", "غير",
];

const RELEVANT_MARKERS: &[&str] = &["relevant", "ذو صلة", "ذات صلة", "مرتبط"];

/// Parse a grader model's reply into a label
///
/// Accepts the label token in any case, wrapped in punctuation or markdown,
/// or in its Arabic form. Negative markers win over positive ones, and a
/// positive marker in a reply that also carries a negation word reads as
/// irrelevant. Anything else is a `GradingParse` error.
pub fn parse_label(output: &str) -> Result<RelevanceLabel, CragError> {
    let normalized = output.trim().to_lowercase();

    if normalized.is_empty() {
        return Err(CragError::grading_parse(output));
    }

    if IRRELEVANT_MARKERS.iter().any(|m| normalized.contains(m)) {
        return Ok(RelevanceLabel::Irrelevant);
    }

    if RELEVANT_MARKERS.iter().any(|m| normalized.contains(m)) {
        if has_negation(&normalized) {
            return Ok(RelevanceLabel::Irrelevant);
        }
        return Ok(RelevanceLabel::Relevant);
    }

    Err(CragError::grading_parse(output))
}

fn has_negation(normalized: &str) -> bool {
    normalized
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .any(|word| NEGATIONS.contains(&word))
}

#[cfg(test)]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Grader answering from a per-candidate-id table
    ///
    /// Ids missing from the table get the default label; ids marked as failing
    /// return a parse error.
    #[derive(Debug)]
    pub struct MockRelevanceGrader {
        labels: HashMap<String, RelevanceLabel>,
        failing: Vec<String>,
        default_label: RelevanceLabel,
        calls: AtomicUsize,
    }

    impl MockRelevanceGrader {
        pub fn new() -> Self {
            Self {
                labels: HashMap::new(),
                failing: Vec::new(),
                default_label: RelevanceLabel::Irrelevant,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_relevant(mut self, ids: &[&str]) -> Self {
            for id in ids {
                self.labels.insert(id.to_string(), RelevanceLabel::Relevant);
            }
            self
        }

        pub fn with_failure_for(mut self, id: &str) -> Self {
            self.failing.push(id.to_string());
            self
        }

        pub fn with_default(mut self, label: RelevanceLabel) -> Self {
            self.default_label = label;
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Default for MockRelevanceGrader {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl RelevanceGrader for MockRelevanceGrader {
        async fn grade(&self, _query: &str, candidate: &Candidate) -> Result<Grade, CragError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.failing.contains(&candidate.id) {
                return Err(CragError::grading_parse("¯\\_(ツ)_/¯"));
            }

            let label = self
                .labels
                .get(&candidate.id)
                .copied()
                .unwrap_or(self.default_label);

            Ok(Grade::new(label))
        }

        fn grader_name(&self) -> &'static str {
            "mock"
        }
    }
}
