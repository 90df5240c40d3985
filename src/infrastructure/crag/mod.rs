//! CRAG infrastructure - LLM-backed collaborators and the loop controller

mod controller;
mod llm_generator;
mod llm_grader;
mod llm_rewriter;
pub mod prompts;
mod threshold_grader;

pub use controller::CragController;
pub use llm_generator::LlmAnswerGenerator;
pub use llm_grader::LlmRelevanceGrader;
pub use llm_rewriter::LlmQueryRewriter;
pub use threshold_grader::ThresholdRelevanceGrader;
