//! Error taxonomy for the analysis pipeline and the provider adapters.

/// Failures surfaced by the core.
///
/// Per-file content fetch failures never appear here; they degrade to empty
/// content inside the content fetcher.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The input is not a `https://<host>/<owner>/<repo>` URL.
    #[error("Invalid GitHub URL. Format: https://github.com/owner/repo (got `{0}`)")]
    InvalidUrl(String),

    /// No candidate branch produced a tree listing.
    #[error(
        "Could not fetch repository structure for {repo} (tried {tried}). \
         Rate limit might be exceeded or repo is private: {cause}"
    )]
    TreeUnavailable {
        /// `owner/name` of the repository.
        repo: String,
        /// Comma separated branch candidates that were probed.
        tried: String,
        /// Raw cause reported for the last candidate.
        cause: String,
    },

    /// The credential is missing or was rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The provider returned a non-success status, or no response at all.
    #[error("{}", provider_message(*status, body))]
    Provider {
        /// HTTP status, `None` when no response was received.
        status: Option<u16>,
        /// Raw response body or transport error text.
        body: String,
    },

    /// The provider answered but the payload does not have the expected shape.
    #[error("malformed provider response: {reason}")]
    MalformedResponse {
        /// What was wrong with the payload.
        reason: String,
        /// The raw text as received, kept for diagnosis.
        raw: String,
    },

    /// The configuration cannot form a request.
    #[error("invalid provider configuration: {0}")]
    InvalidConfig(String),
}

fn provider_message(status: Option<u16>, body: &str) -> String {
    match status {
        Some(code) => format!("Provider Error ({code}): {body}"),
        None => format!("Failed to connect to LLM provider: {body}"),
    }
}
