//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the analysis core and an
//! external system (time, the repository host, the LLM provider).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod llm;
pub mod repo_host;

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

pub use clock::Clock;
pub use llm::{AuthScheme, LlmRequest, LlmResponse, LlmTransport};
pub use repo_host::{RepoHost, TreeListing, TreeNode};

/// Error type returned by port methods.
pub type PortError = Box<dyn Error + Send + Sync>;

/// Boxed future returned by async port methods, keeping the traits dyn-compatible.
pub type PortFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PortError>> + Send + 'a>>;
