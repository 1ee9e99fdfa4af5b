//! Core data model shared by the pipeline, the provider adapters and the CLI.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A public repository located from a URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryRef {
    /// Repository owner (user or organisation).
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Branch confirmed by the tree fetcher; `None` until a probe succeeds.
    pub branch: Option<String>,
    /// The URL the reference was parsed from.
    pub source_url: String,
}

impl RepositoryRef {
    /// `owner/name`, used in logs and error messages.
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Whether a tree node is a file or a directory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A regular file (git blob).
    File,
    /// A directory, or anything else that is not a blob.
    Directory,
}

/// One node of a repository tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeEntry {
    /// Last path segment.
    pub name: String,
    /// Path relative to the repository root.
    pub path: String,
    /// File or directory.
    pub kind: EntryKind,
    /// Raw-content URL; present only for files.
    pub content_url: Option<String>,
}

impl TreeEntry {
    /// Returns `true` for file entries.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// A selected tree entry with its fetched content.
///
/// `content` is empty when the fetch failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectedFile {
    /// The tree entry this content belongs to.
    pub entry: TreeEntry,
    /// Raw text content, or an empty string on any fetch failure.
    pub content: String,
}

/// The structured artifact produced by a provider.
///
/// Field names on the wire follow the JSON contract every provider is asked
/// to produce; all six fields are required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisResult {
    /// Generated or improved Dockerfile.
    pub dockerfile: String,
    /// Generated compose file.
    #[serde(rename = "dockerCompose")]
    pub compose_file: String,
    /// Short description of the repository.
    #[serde(rename = "readmeSummary")]
    pub summary: String,
    /// Build and run instructions.
    pub instructions: String,
    /// Dependencies the model detected, in the order it reported them.
    #[serde(rename = "detectedDependencies")]
    pub detected_dependencies: Vec<String>,
    /// Suggested health check.
    #[serde(rename = "healthCheckSuggestion")]
    pub health_check_suggestion: String,
}

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The person asking questions.
    User,
    /// The model.
    Assistant,
}

/// One turn of a follow-up chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    /// Who said it.
    pub speaker: Speaker,
    /// What was said.
    pub text: String,
    /// When the turn was appended.
    pub created_at: DateTime<Utc>,
}

/// The three provider variants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Gemini, using schema-constrained generation.
    #[default]
    #[serde(alias = "google", alias = "primary")]
    #[value(alias = "google", alias = "primary")]
    Gemini,
    /// OpenAI chat completions.
    #[serde(alias = "openai-compatible")]
    #[value(alias = "openai-compatible")]
    Openai,
    /// Any OpenAI-compatible endpoint at a user supplied base URL.
    #[serde(alias = "custom-openai-compatible")]
    #[value(alias = "custom-openai-compatible")]
    Custom,
}

impl ProviderKind {
    /// Default model identifier, if the provider has one.
    #[must_use]
    pub fn default_model(self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some("gemini-3-pro-preview"),
            Self::Openai => Some("gpt-4o"),
            Self::Custom => None,
        }
    }

    /// Suggested models as `(identifier, label)` pairs.
    #[must_use]
    pub fn suggested_models(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Gemini => &[
                ("gemini-3-pro-preview", "Gemini 3.0 Pro (Recommended)"),
                ("gemini-2.5-flash", "Gemini 2.5 Flash (Fast)"),
            ],
            Self::Openai => &[
                ("gpt-4o", "GPT-4o"),
                ("gpt-4-turbo", "GPT-4 Turbo"),
                ("gpt-3.5-turbo", "GPT-3.5 Turbo"),
            ],
            Self::Custom => &[],
        }
    }

    /// Human-readable provider label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Gemini => "Google Gemini",
            Self::Openai => "OpenAI",
            Self::Custom => "Custom (OpenAI Compatible)",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Gemini => "gemini",
            Self::Openai => "openai",
            Self::Custom => "custom",
        };
        f.write_str(tag)
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" | "primary" => Ok(Self::Gemini),
            "openai" | "openai-compatible" => Ok(Self::Openai),
            "custom" | "custom-openai-compatible" => Ok(Self::Custom),
            other => Err(format!("unknown provider `{other}` (expected gemini, openai or custom)")),
        }
    }
}

/// An API credential. Never printed, never serialized.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into().trim().to_string())
    }

    /// Returns `true` when no usable secret is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Exposes the secret for placing it in a request header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Replaces every occurrence of the secret in `text`.
    #[must_use]
    pub fn scrub(&self, text: &str) -> String {
        if self.0.is_empty() {
            text.to_string()
        } else {
            text.replace(&self.0, "***")
        }
    }

    /// A masked form safe for display, keeping the last four characters.
    #[must_use]
    pub fn masked(&self) -> String {
        if self.0.is_empty() {
            return "(not set)".to_string();
        }
        let chars: Vec<char> = self.0.chars().collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        format!("****{tail}")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Everything a provider needs for one request. Supplied per call, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Which provider variant to use.
    pub provider: ProviderKind,
    /// Explicitly configured credential; may be empty.
    pub credential: Credential,
    /// Model identifier.
    pub model: String,
    /// Endpoint base URL override.
    pub endpoint_base: Option<String>,
}
