//! Query reformulation contract

use std::fmt::Debug;

use async_trait::async_trait;

use super::CragError;

/// Produces a new formulation of a query that retrieved nothing useful
#[async_trait]
pub trait QueryRewriter: Send + Sync + Debug {
    /// Rewrite `current`. `history` holds every query already tried in this
    /// session, oldest first, including `current`.
    async fn rewrite(&self, current: &str, history: &[String]) -> Result<String, CragError>;

    /// Get the rewriter name
    fn rewriter_name(&self) -> &'static str;
}

fn normalize(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Why a rewritten query is unusable as a fresh formulation, if it is
///
/// Empty output and exact repeats of an earlier query (ignoring case and
/// whitespace) are degenerate.
pub fn is_degenerate_rewrite(rewritten: &str, history: &[String]) -> Option<String> {
    let normalized = normalize(rewritten);

    if normalized.is_empty() {
        return Some("empty rewrite".to_string());
    }

    history
        .iter()
        .position(|previous| normalize(previous) == normalized)
        .map(|index| format!("duplicates query #{}", index + 1))
}
