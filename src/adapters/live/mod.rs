//! Live adapters for real external interactions.

pub mod clock;
pub mod llm;
pub mod repo_host;

pub use clock::LiveClock;
pub use llm::HttpLlmTransport;
pub use repo_host::{GitHubHost, GITHUB_API_BASE, GITHUB_RAW_BASE};

/// User agent sent with every outgoing request.
pub(crate) const USER_AGENT: &str = concat!("dockerize/", env!("CARGO_PKG_VERSION"));
