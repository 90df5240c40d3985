//! CRAG (Corrective RAG) domain
//!
//! Types and collaborator contracts for the corrective retrieval loop:
//! retrieve, grade every candidate, then answer, reformulate the query, or
//! decline. The controller that drives the loop lives in
//! `infrastructure::crag`.

mod config;
mod error;
mod generation;
mod grading;
mod outcome;
mod rewriting;
mod state;

pub use config::{CragConfig, GradingStrategy};
pub use error::CragError;
pub use generation::{bind_citations, AnswerGenerator, GeneratedAnswer};
pub use grading::{parse_label, Grade, GradedCandidate, RelevanceGrader, RelevanceLabel};
pub use outcome::{AnswerResult, AnswerStatus, ErrorDetail, ErrorKind, SessionTrace, DECLINE_MESSAGE};
pub use rewriting::{is_degenerate_rewrite, QueryRewriter};
pub use state::{route, CragState, CragStep, Query, RouteDecision};

#[cfg(test)]
pub use generation::mock::MockAnswerGenerator;
#[cfg(test)]
pub use grading::mock::MockRelevanceGrader;
#[cfg(test)]
pub use rewriting::mock::MockQueryRewriter;
