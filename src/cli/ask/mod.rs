//! Ask command - answers one question and prints the session trace

use std::fmt::Write as _;

use clap::Args;
use tokio::signal;
use tracing::warn;

use crate::config::AppConfig;
use crate::domain::crag::{AnswerResult, AnswerStatus};
use crate::infrastructure::logging::init_logging;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Legal question, in Arabic
    pub question: String,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Answer one question; Ctrl+C cancels the session
pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let controller = crate::build_controller(&config)?;

    let cancel = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let result = controller.answer_until(&args.question, cancel).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render(&result));
    }

    match result.error_detail {
        Some(detail) if result.status == AnswerStatus::Error => {
            anyhow::bail!("{:?}: {}", detail.kind, detail.message)
        }
        _ => Ok(()),
    }
}

/// Human-readable rendering of a session result
fn render(result: &AnswerResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "الحالة: {}", result.status.as_str());

    if let Some(ref text) = result.answer_text {
        let _ = writeln!(out, "\n{}", text);
    }

    if !result.citations.is_empty() {
        let _ = writeln!(out, "\nالمصادر:");
        for (i, citation) in result.citations.iter().enumerate() {
            let _ = writeln!(out, "  [{}] {}", i + 1, citation);
        }
    }

    if let Some(ref detail) = result.error_detail {
        let _ = writeln!(out, "\nخطأ ({:?}): {}", detail.kind, detail.message);
    }

    let trace = &result.trace;
    let _ = writeln!(
        out,
        "\nجولات الاسترجاع: {} | إعادات الصياغة: {}",
        trace.retrieval_rounds, trace.rewrite_attempts
    );
    for (i, query) in trace.query_history.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, query);
    }

    out
}
