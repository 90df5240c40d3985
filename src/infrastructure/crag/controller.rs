//! CRAG controller
//!
//! Drives one session through retrieve, grade, route and then generate,
//! rewrite or decline. Each call to [`CragController::answer`] owns a fresh
//! [`CragState`]; nothing is shared between sessions except the collaborator
//! handles.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::crag::{
    is_degenerate_rewrite, AnswerGenerator, AnswerResult, CragConfig, CragError, CragState,
    CragStep, ErrorDetail, GeneratedAnswer, Grade, GradedCandidate, QueryRewriter,
    RelevanceGrader, SessionTrace,
};
use crate::domain::retrieval::{Candidate, RetrieverGateway};
use crate::infrastructure::observability::{
    record_crag_grade, record_crag_grade_failure, record_crag_rewrite, record_crag_session,
};

/// Terminal outcome of a session that did not fail
enum Conclusion {
    Answered(GeneratedAnswer),
    Declined,
}

#[derive(Debug, Clone)]
pub struct CragController {
    retriever: Arc<dyn RetrieverGateway>,
    grader: Arc<dyn RelevanceGrader>,
    rewriter: Arc<dyn QueryRewriter>,
    generator: Arc<dyn AnswerGenerator>,
    config: CragConfig,
}

impl CragController {
    pub fn new(
        retriever: Arc<dyn RetrieverGateway>,
        grader: Arc<dyn RelevanceGrader>,
        rewriter: Arc<dyn QueryRewriter>,
        generator: Arc<dyn AnswerGenerator>,
        config: CragConfig,
    ) -> Self {
        Self {
            retriever,
            grader,
            rewriter,
            generator,
            config,
        }
    }

    pub fn config(&self) -> &CragConfig {
        &self.config
    }

    pub fn retriever(&self) -> &Arc<dyn RetrieverGateway> {
        &self.retriever
    }

    /// Answer one question
    pub async fn answer(&self, query: &str) -> AnswerResult {
        self.answer_until(query, std::future::pending()).await
    }

    /// Answer one question, giving up as soon as `cancel` resolves
    ///
    /// On cancellation the in-flight collaborator call is dropped and the
    /// result has an error status with a `cancelled` detail.
    pub async fn answer_until<F>(&self, query: &str, cancel: F) -> AnswerResult
    where
        F: Future<Output = ()>,
    {
        let session_id = Uuid::new_v4();
        let span = info_span!("crag_session", session_id = %session_id);

        self.run_session(session_id, query, cancel)
            .instrument(span)
            .await
    }

    async fn run_session<F>(&self, session_id: Uuid, query: &str, cancel: F) -> AnswerResult
    where
        F: Future<Output = ()>,
    {
        let started = Instant::now();
        let query = query.trim();

        if query.is_empty() {
            warn!("Rejected empty query");
            let result = AnswerResult::error(
                ErrorDetail::invalid_query("query must not be empty"),
                SessionTrace::empty(session_id),
            );
            record_crag_session(result.status.as_str(), started.elapsed(), 0);
            return result;
        }

        info!(
            top_k = self.config.top_k,
            max_rewrite_attempts = self.config.max_rewrite_attempts,
            grader = self.grader.grader_name(),
            "CRAG session started"
        );

        let mut state = CragState::new(session_id, query, self.config.max_rewrite_attempts);

        let outcome = tokio::select! {
            biased;
            _ = cancel => None,
            outcome = self.drive(&mut state) => Some(outcome),
        };

        let result = match outcome {
            Some(Ok(Conclusion::Answered(answer))) => {
                AnswerResult::answered(answer.text, answer.citations, state.trace())
            }
            Some(Ok(Conclusion::Declined)) => AnswerResult::declined(state.trace()),
            Some(Err(e)) => {
                error!(error = %e, step = state.step().as_str(), "CRAG session failed");
                AnswerResult::error(ErrorDetail::from(&e), state.trace())
            }
            None => {
                warn!(step = state.step().as_str(), "CRAG session cancelled");
                AnswerResult::error(ErrorDetail::from(&CragError::Cancelled), state.trace())
            }
        };

        info!(
            status = result.status.as_str(),
            retrieval_rounds = state.retrieval_rounds(),
            rewrite_attempts = state.rewrite_attempts(),
            citations = result.citations.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "CRAG session finished"
        );
        record_crag_session(
            result.status.as_str(),
            started.elapsed(),
            state.retrieval_rounds(),
        );

        result
    }

    /// Step the state machine until a terminal step is reached
    async fn drive(&self, state: &mut CragState) -> Result<Conclusion, CragError> {
        loop {
            debug!(step = state.step().as_str(), "CRAG step");

            match state.step() {
                CragStep::Retrieve => {
                    let candidates = self.retrieve(&state.current().text).await?;
                    state.record_retrieval(candidates);
                }
                CragStep::Grade => {
                    let graded = self
                        .grade_round(&state.current().text, state.candidates())
                        .await;
                    state.record_grades(graded);
                }
                CragStep::Route => {
                    let decision = state.route();
                    info!(
                        decision = ?decision,
                        relevant = state.relevant_count(),
                        candidates = state.candidates().len(),
                        round = state.retrieval_rounds(),
                        rewrite_attempts = state.rewrite_attempts(),
                        "Routing decision"
                    );
                }
                CragStep::Rewrite => {
                    let next = self.next_query(state).await;
                    state.apply_rewrite(next);
                }
                CragStep::Generate => {
                    let answer = self.generate(state).await?;
                    return Ok(Conclusion::Answered(answer));
                }
                CragStep::Decline => return Ok(Conclusion::Declined),
            }
        }
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<Candidate>, CragError> {
        let mut candidates = self
            .retriever
            .search(query, self.config.top_k)
            .await
            .map_err(|e| CragError::Retrieval(e.to_string()))?;

        candidates.truncate(self.config.top_k);

        debug!(
            gateway = self.retriever.gateway_name(),
            returned = candidates.len(),
            "Candidates retrieved"
        );

        Ok(candidates)
    }

    /// Grade every candidate of the round; failures degrade to irrelevant
    async fn grade_round(&self, query: &str, candidates: &[Arc<Candidate>]) -> Vec<GradedCandidate> {
        let grade_one = |candidate: Arc<Candidate>| async move {
            let result = self.grader.grade(query, &candidate).await;
            settle_grade(candidate, result)
        };

        if self.config.parallel_grading {
            join_all(candidates.iter().cloned().map(grade_one)).await
        } else {
            let mut graded = Vec::with_capacity(candidates.len());
            for candidate in candidates {
                graded.push(grade_one(Arc::clone(candidate)).await);
            }
            graded
        }
    }

    /// Ask the rewriter for the next formulation
    ///
    /// A failed or degenerate rewrite still consumes the attempt; the loop
    /// retries with whatever text is usable, falling back to the current query.
    async fn next_query(&self, state: &CragState) -> String {
        let current = &state.current().text;

        let rewritten = match self.rewriter.rewrite(current, state.history()).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                let degenerate = CragError::rewrite_degenerate(e.to_string());
                warn!(error = %degenerate, "Rewrite failed, retrying with the current query");
                record_crag_rewrite(true);
                return current.clone();
            }
        };

        match is_degenerate_rewrite(&rewritten, state.history()) {
            None => {
                info!(from = %current, to = %rewritten, "Query rewritten");
                record_crag_rewrite(false);
                rewritten
            }
            Some(reason) => {
                let degenerate = CragError::rewrite_degenerate(reason);
                warn!(error = %degenerate, rewritten = %rewritten, "Degenerate rewrite");
                record_crag_rewrite(true);
                if rewritten.is_empty() {
                    current.clone()
                } else {
                    rewritten
                }
            }
        }
    }

    /// Generate from the relevant candidates and keep only citations they back
    async fn generate(&self, state: &CragState) -> Result<GeneratedAnswer, CragError> {
        let relevant = state.relevant_candidates();

        let answer = self
            .generator
            .generate(state.original_query(), &relevant)
            .await
            .map_err(|e| match e {
                CragError::Generation(_) => e,
                other => CragError::generation(other.to_string()),
            })?;

        let text = answer.text.trim();
        if text.is_empty() {
            return Err(CragError::generation("generator returned an empty answer"));
        }

        let mut citations = answer.citations;
        let before = citations.len();
        citations.retain(|citation| relevant.iter().any(|c| &c.citation == citation));

        if citations.len() < before {
            warn!(
                dropped = before - citations.len(),
                "Dropped citations not backed by a relevant passage"
            );
        }

        if citations.is_empty() {
            return Err(CragError::generation(
                "answer carries no citation from the relevant passages",
            ));
        }

        Ok(GeneratedAnswer::new(text, citations))
    }
}

fn settle_grade(candidate: Arc<Candidate>, result: Result<Grade, CragError>) -> GradedCandidate {
    match result {
        Ok(grade) => {
            record_crag_grade(grade.label.as_str());
            GradedCandidate::new(candidate, grade)
        }
        Err(e) => {
            warn!(
                candidate_id = %candidate.id,
                error = %e,
                "Grading failed, treating candidate as irrelevant"
            );
            record_crag_grade_failure();
            record_crag_grade("irrelevant");
            GradedCandidate::degraded(candidate)
        }
    }
}
