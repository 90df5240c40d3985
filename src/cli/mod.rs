//! CLI module for the legal CRAG service
//!
//! Provides subcommands:
//! - `serve`: HTTP API
//! - `ask`: answer one question from the terminal

pub mod ask;
pub mod serve;

use clap::{Parser, Subcommand};

/// Corrective RAG answers over Egyptian legislation
#[derive(Parser)]
#[command(name = "legal-crag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Answer a single question and print the result
    Ask(ask::AskArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["legal-crag", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve));
    }

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from(["legal-crag", "ask", "ما عقوبة السرقة؟", "--json"]).unwrap();

        match cli.command {
            Command::Ask(args) => {
                assert_eq!(args.question, "ما عقوبة السرقة؟");
                assert!(args.json);
            }
            Command::Serve => panic!("expected ask"),
        }
    }

    #[test]
    fn test_ask_requires_question() {
        assert!(Cli::try_parse_from(["legal-crag", "ask"]).is_err());
    }
}
