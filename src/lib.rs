//! Core library for the `dockerize` CLI.
//!
//! Given a public GitHub repository URL, `dockerize` lists the repository
//! tree, picks the files that describe how the project is built and run,
//! and asks an LLM provider for a Dockerfile, a compose file and run
//! instructions. The result can then be discussed in a follow-up chat.
//!
//! The operations a front end needs live in [`service`]; external systems
//! are reached only through the traits in [`ports`].

pub mod adapters;
pub mod cassette;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod context;
pub mod error;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod ports;
pub mod provider;
pub mod repo;
pub mod service;
pub mod settings;

use clap::error::ErrorKind;
use clap::Parser;

pub use error::AnalysisError;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    // Already initialised when embedded in a host that set up tracing.
    let _ = logging::init(cli.verbose);
    commands::dispatch(&cli)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_lists_models() {
        assert!(run(["dockerize", "models", "--provider", "openai"]).is_ok());
    }

    #[test]
    fn run_prints_help() {
        assert!(run(["dockerize", "--help"]).is_ok());
    }

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["dockerize", "unknown"]);
        assert!(result.is_err());
    }
}
