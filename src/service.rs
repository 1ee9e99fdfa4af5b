//! The operations offered to a front end.
//!
//! Each takes the [`ServiceContext`] holding the ports and a
//! [`ProviderConfig`] supplied per call.

use tracing::warn;

use crate::context::ServiceContext;
use crate::error::AnalysisError;
use crate::model::{AnalysisResult, ChatTurn, ProviderConfig, RepositoryRef};
use crate::pipeline::StageEvent;
use crate::provider;

/// Parses a repository URL.
///
/// # Errors
///
/// Returns `InvalidUrl` when the URL has fewer than two path segments.
pub fn locate_repository(url: &str) -> Result<RepositoryRef, AnalysisError> {
    crate::repo::locate(url)
}

/// Starts an analysis and returns its stage events.
///
/// Must be called from within a tokio runtime.
#[must_use]
pub fn run_analysis(
    ctx: &ServiceContext,
    repo: RepositoryRef,
    config: &ProviderConfig,
) -> tokio::sync::mpsc::UnboundedReceiver<StageEvent> {
    crate::pipeline::run_analysis(ctx, repo, config)
}

/// Asks one follow-up question. `history` holds the turns before `message`.
///
/// # Errors
///
/// `InvalidConfig`, `Auth`, `Provider` or `MalformedResponse` from the
/// provider. Callers holding a conversation usually go through
/// [`crate::chat::ChatSession`], which turns failures into an assistant turn.
pub async fn send_chat_message(
    ctx: &ServiceContext,
    config: &ProviderConfig,
    history: &[ChatTurn],
    message: &str,
    context: &AnalysisResult,
) -> Result<String, AnalysisError> {
    let provider = provider::build(config, ctx.llm.clone(), ctx.network.transport_retries)?;
    provider.continue_chat(history, message, context).await
}

/// Returns whether the configured provider accepts a minimal request.
pub async fn verify_provider_connection(ctx: &ServiceContext, config: &ProviderConfig) -> bool {
    match provider::build(config, ctx.llm.clone(), ctx.network.transport_retries) {
        Ok(provider) => provider.test_connection().await,
        Err(e) => {
            warn!(error = %e, "cannot build provider");
            false
        }
    }
}
