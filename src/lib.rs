//! Legal CRAG
//!
//! Corrective retrieval-augmented question answering over Egyptian
//! legislation:
//! - Dense retrieval from a Qdrant collection of legal articles
//! - Per-passage relevance grading before any answer is written
//! - Bounded query reformulation when nothing relevant comes back
//! - Cited answers, or an honest refusal

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use domain::crag::{GradingStrategy, RelevanceGrader};
use domain::embedding::EmbeddingProvider;
use domain::llm::LlmProvider;
use domain::DomainError;
use infrastructure::crag::{
    CragController, LlmAnswerGenerator, LlmQueryRewriter, LlmRelevanceGrader,
    ThresholdRelevanceGrader,
};
use infrastructure::embedding::OpenAiEmbeddingProvider;
use infrastructure::llm::{HttpClient, OpenAiProvider};
use infrastructure::retrieval::{QdrantConfig, QdrantGateway};
use tracing::info;

/// HTTP clients for the two stages of a session
///
/// Query embedding is part of retrieval, so it shares the retrieval client and
/// is bounded by `qdrant.timeout_secs`. Grading, rewriting and generation use
/// `llm.timeout_secs`.
#[derive(Debug, Clone)]
struct StageClients {
    retrieval: HttpClient,
    llm: HttpClient,
}

impl StageClients {
    fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        Ok(Self {
            retrieval: HttpClient::with_timeout(Duration::from_secs(config.qdrant.timeout_secs))?,
            llm: HttpClient::with_timeout(Duration::from_secs(config.llm.timeout_secs))?,
        })
    }
}

/// Build the controller and its collaborators from configuration
///
/// HTTP clients, the embedding provider and the LLM provider are created once
/// here and shared by every session.
pub fn build_controller(config: &AppConfig) -> Result<CragController, DomainError> {
    let StageClients {
        retrieval: index_client,
        llm: llm_client,
    } = StageClients::from_config(config)?;

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAiEmbeddingProvider::with_base_url(
        index_client.clone(),
        config.embedding.api_key.clone().unwrap_or_default(),
        config.embedding.base_url.clone(),
    ));

    let mut qdrant = QdrantConfig::new(config.qdrant.url.clone(), config.qdrant.collection.clone())
        .with_embedding_model(config.embedding.model.clone())
        .with_query_prefix(config.embedding.query_prefix.clone());
    if let Some(ref api_key) = config.qdrant.api_key {
        qdrant = qdrant.with_api_key(api_key.clone());
    }
    let retriever = Arc::new(QdrantGateway::new(index_client, embedder, qdrant));

    let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::with_base_url(
        llm_client,
        config.llm.api_key.clone().unwrap_or_default(),
        config.llm.base_url.clone(),
    ));

    let crag = &config.crag;
    let grader: Arc<dyn RelevanceGrader> = match crag.grading_strategy {
        GradingStrategy::LlmLabel => Arc::new(LlmRelevanceGrader::new(
            Arc::clone(&llm),
            config.llm.grader_model.clone(),
            crag,
        )),
        GradingStrategy::Threshold => Arc::new(ThresholdRelevanceGrader::from_config(crag)),
    };
    let rewriter = Arc::new(LlmQueryRewriter::new(
        Arc::clone(&llm),
        config.llm.rewriter_model(),
        crag,
    ));
    let generator = Arc::new(LlmAnswerGenerator::new(
        llm,
        config.llm.generator_model.clone(),
        crag,
    ));

    info!(
        collection = %config.qdrant.collection,
        grading_strategy = ?crag.grading_strategy,
        top_k = crag.top_k,
        max_rewrite_attempts = crag.max_rewrite_attempts,
        "CRAG controller built"
    );

    Ok(CragController::new(
        retriever,
        grader,
        rewriter,
        generator,
        crag.clone(),
    ))
}
