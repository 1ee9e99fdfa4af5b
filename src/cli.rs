//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::ProviderKind;
use crate::settings::ProviderOverrides;

/// Top-level CLI parser for `dockerize`.
#[derive(Debug, Parser)]
#[command(
    name = "dockerize",
    version,
    about = "Generate a Dockerfile and docker-compose.yml for a public GitHub repository"
)]
pub struct Cli {
    /// Configuration file (default: `.dockerize/config.yaml`, or `DOCKERIZE_CONFIG`).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a repository and print the generated container setup.
    Analyze(AnalyzeArgs),
    /// Chat about a previously saved analysis.
    Chat {
        /// `analysis.json` written by `analyze --out`.
        #[arg(long, value_name = "FILE")]
        context: PathBuf,
        /// Provider selection.
        #[command(flatten)]
        provider: ProviderArgs,
    },
    /// List the files an analysis would send, without calling a provider.
    Scan {
        /// Repository URL, e.g. `https://github.com/owner/repo`.
        url: String,
    },
    /// Check that the configured provider accepts requests.
    Verify {
        /// Provider selection.
        #[command(flatten)]
        provider: ProviderArgs,
    },
    /// Show, change or delete the saved configuration.
    Config {
        /// What to do with the configuration record.
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List suggested models.
    Models {
        /// Only list models for this provider.
        #[arg(long, value_enum)]
        provider: Option<ProviderKind>,
    },
}

/// Arguments of `dockerize analyze`.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Repository URL, e.g. `https://github.com/owner/repo`.
    pub url: String,

    /// Write Dockerfile, docker-compose.yml, INSTRUCTIONS.md and analysis.json here.
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Start a follow-up chat after the analysis.
    #[arg(long)]
    pub chat: bool,

    /// Provider selection.
    #[command(flatten)]
    pub provider: ProviderArgs,
}

/// `config` subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the saved configuration with the API key masked.
    Show,
    /// Save provider settings.
    Set(ProviderArgs),
    /// Delete the configuration file.
    Reset,
}

/// Flags selecting and configuring the provider.
#[derive(Debug, Clone, Default, Args)]
pub struct ProviderArgs {
    /// Provider to use.
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Model identifier.
    #[arg(long)]
    pub model: Option<String>,

    /// API key.
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Endpoint base URL, required for the custom provider.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
}

impl ProviderArgs {
    /// The flags as configuration overrides.
    #[must_use]
    pub fn overrides(&self) -> ProviderOverrides {
        ProviderOverrides {
            provider: self.provider,
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, ConfigAction};
    use crate::model::ProviderKind;
    use clap::Parser;

    #[test]
    fn parses_analyze_with_provider_flags() {
        let cli = Cli::parse_from([
            "dockerize",
            "analyze",
            "https://github.com/acme/widgets",
            "--provider",
            "custom",
            "--base-url",
            "http://localhost:11434/v1",
            "--model",
            "llama3",
            "--out",
            "build",
        ]);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.url, "https://github.com/acme/widgets");
        assert_eq!(args.provider.provider, Some(ProviderKind::Custom));
        assert_eq!(args.provider.overrides().model.as_deref(), Some("llama3"));
        assert!(args.out.is_some());
        assert!(!args.chat);
    }

    #[test]
    fn provider_aliases_are_accepted() {
        let cli = Cli::parse_from(["dockerize", "verify", "--provider", "google"]);
        let Command::Verify { provider } = cli.command else {
            panic!("expected verify");
        };
        assert_eq!(provider.provider, Some(ProviderKind::Gemini));
    }

    #[test]
    fn parses_config_set_and_global_flags() {
        let cli = Cli::parse_from([
            "dockerize",
            "config",
            "set",
            "--api-key",
            "k",
            "--config",
            "/tmp/c.yaml",
            "-v",
        ]);
        assert!(cli.verbose);
        assert!(cli.config.is_some());
        assert!(matches!(cli.command, Command::Config { action: ConfigAction::Set(_) }));
    }

    #[test]
    fn chat_requires_context() {
        assert!(Cli::try_parse_from(["dockerize", "chat"]).is_err());
    }
}
