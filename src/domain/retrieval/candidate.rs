//! Retrieved passages and their citation metadata

use std::fmt;

use serde::{Deserialize, Serialize};

/// Structured reference to the legal text a passage came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Citation {
    /// Name of the law or code (e.g. "القانون المدني")
    pub source_name: String,
    /// Article or section identifier within the source
    pub article_ref: String,
    /// Year the law was issued, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Official law number, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub law_number: Option<String>,
}

impl Citation {
    pub fn new(source_name: impl Into<String>, article_ref: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            article_ref: article_ref.into(),
            year: None,
            law_number: None,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_law_number(mut self, law_number: impl Into<String>) -> Self {
        self.law_number = Some(law_number.into());
        self
    }
}

impl fmt::Display for Citation {
    /// Renders as `source - المادة article (year)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - المادة {}", self.source_name, self.article_ref)?;
        if let Some(ref number) = self.law_number {
            write!(f, " - القانون رقم {}", number)?;
        }
        if let Some(year) = self.year {
            write!(f, " ({})", year)?;
        }
        Ok(())
    }
}

/// One passage returned by a retrieval round
///
/// Candidates are never mutated after retrieval; grading attaches labels to
/// them by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Opaque identifier assigned by the vector index
    pub id: String,
    /// Passage text
    pub text: String,
    /// Similarity score from the vector search (higher is more similar)
    pub score: f32,
    /// Where the passage came from
    pub citation: Citation,
}

impl Candidate {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        score: f32,
        citation: Citation,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            score,
            citation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_citation_display_full() {
        let citation = Citation::new("القانون المدني", "802")
            .with_law_number("131")
            .with_year(1948);

        assert_eq!(
            citation.to_string(),
            "القانون المدني - المادة 802 - القانون رقم 131 (1948)"
        );
    }

    #[test]
    fn test_citation_display_without_optional_fields() {
        let citation = Citation::new("قانون العقوبات", "317");

        assert_eq!(citation.to_string(), "قانون العقوبات - المادة 317");
    }

    #[test]
    fn test_citation_serialization_skips_missing_fields() {
        let citation = Citation::new("قانون العمل", "69").with_year(2003);
        let json = serde_json::to_value(&citation).unwrap();

        assert_eq!(json["source_name"], "قانون العمل");
        assert_eq!(json["article_ref"], "69");
        assert_eq!(json["year"], 2003);
        assert!(json.get("law_number").is_none());
    }
}
