//! Per-session state of the corrective loop

use std::sync::Arc;

use uuid::Uuid;

use super::{GradedCandidate, SessionTrace};
use crate::domain::retrieval::Candidate;

/// A formulation of the user's question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    /// 0 for the original question, n for the n-th rewrite
    pub attempt: u32,
}

impl Query {
    pub fn original(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attempt: 0,
        }
    }
}

/// Steps of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CragStep {
    Retrieve,
    Grade,
    Route,
    Generate,
    Rewrite,
    Decline,
}

impl CragStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::Grade => "grade",
            Self::Route => "route",
            Self::Generate => "generate",
            Self::Rewrite => "rewrite",
            Self::Decline => "decline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Generate,
    Rewrite,
    Decline,
}

/// Routing policy applied after every grading round
///
/// Any relevant candidate wins. Otherwise rewrite while attempts remain,
/// then decline.
pub fn route(relevant_count: usize, rewrite_attempts: u32, max_rewrite_attempts: u32) -> RouteDecision {
    if relevant_count > 0 {
        RouteDecision::Generate
    } else if rewrite_attempts < max_rewrite_attempts {
        RouteDecision::Rewrite
    } else {
        RouteDecision::Decline
    }
}

/// Mutable state owned by exactly one session
#[derive(Debug)]
pub struct CragState {
    session_id: Uuid,
    current: Query,
    history: Vec<String>,
    candidates: Vec<Arc<Candidate>>,
    graded: Vec<GradedCandidate>,
    rewrite_attempts: u32,
    retrieval_rounds: u32,
    max_rewrite_attempts: u32,
    step: CragStep,
}

impl CragState {
    pub fn new(session_id: Uuid, query: impl Into<String>, max_rewrite_attempts: u32) -> Self {
        let current = Query::original(query);
        Self {
            session_id,
            history: vec![current.text.clone()],
            current,
            candidates: Vec::new(),
            graded: Vec::new(),
            rewrite_attempts: 0,
            retrieval_rounds: 0,
            max_rewrite_attempts,
            step: CragStep::Retrieve,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn step(&self) -> CragStep {
        self.step
    }

    pub fn current(&self) -> &Query {
        &self.current
    }

    /// The question as the user asked it
    pub fn original_query(&self) -> &str {
        &self.history[0]
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn candidates(&self) -> &[Arc<Candidate>] {
        &self.candidates
    }

    pub fn graded(&self) -> &[GradedCandidate] {
        &self.graded
    }

    pub fn rewrite_attempts(&self) -> u32 {
        self.rewrite_attempts
    }

    pub fn retrieval_rounds(&self) -> u32 {
        self.retrieval_rounds
    }

    /// Store a round's candidates, replacing the previous round
    pub fn record_retrieval(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates.into_iter().map(Arc::new).collect();
        self.graded.clear();
        self.retrieval_rounds += 1;
        self.step = CragStep::Grade;
    }

    pub fn record_grades(&mut self, graded: Vec<GradedCandidate>) {
        debug_assert_eq!(graded.len(), self.candidates.len());
        self.graded = graded;
        self.step = CragStep::Route;
    }

    pub fn relevant_count(&self) -> usize {
        self.graded.iter().filter(|g| g.is_relevant()).count()
    }

    /// Relevant candidates of the latest round, in retrieval order
    pub fn relevant_candidates(&self) -> Vec<Arc<Candidate>> {
        self.graded
            .iter()
            .filter(|g| g.is_relevant())
            .map(|g| Arc::clone(&g.candidate))
            .collect()
    }

    /// Apply the routing policy and move to the chosen step
    pub fn route(&mut self) -> RouteDecision {
        let decision = route(
            self.relevant_count(),
            self.rewrite_attempts,
            self.max_rewrite_attempts,
        );
        self.step = match decision {
            RouteDecision::Generate => CragStep::Generate,
            RouteDecision::Rewrite => CragStep::Rewrite,
            RouteDecision::Decline => CragStep::Decline,
        };
        decision
    }

    /// Install the next formulation and go back to retrieval
    pub fn apply_rewrite(&mut self, text: impl Into<String>) {
        debug_assert!(self.rewrite_attempts < self.max_rewrite_attempts);
        self.rewrite_attempts += 1;
        self.current = Query {
            text: text.into(),
            attempt: self.rewrite_attempts,
        };
        self.history.push(self.current.text.clone());
        self.step = CragStep::Retrieve;
    }

    pub fn trace(&self) -> SessionTrace {
        SessionTrace {
            session_id: self.session_id,
            retrieval_rounds: self.retrieval_rounds,
            rewrite_attempts: self.rewrite_attempts,
            query_history: self.history.clone(),
        }
    }
}
