//! Follow-up chat grounded in a finished analysis.

use tracing::warn;

use crate::model::{AnalysisResult, ChatTurn, Speaker};
use crate::ports::Clock;
use crate::provider::Provider;

/// Assistant text used when a turn fails.
pub const CHAT_FAILURE_REPLY: &str = "Sorry, I encountered an error responding to that.";

/// A conversation about one [`AnalysisResult`].
///
/// The context is never modified. A failed turn becomes an apologetic
/// assistant turn and the session carries on.
#[derive(Debug, Clone)]
pub struct ChatSession {
    context: AnalysisResult,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    /// Starts an empty conversation.
    #[must_use]
    pub fn new(context: AnalysisResult) -> Self {
        Self { context, history: Vec::new() }
    }

    /// The artifact the conversation is about.
    #[must_use]
    pub fn context(&self) -> &AnalysisResult {
        &self.context
    }

    /// Turns so far, oldest first.
    #[must_use]
    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Sends `message` and appends both the user turn and the reply.
    ///
    /// Returns the assistant turn.
    pub async fn ask(&mut self, provider: &dyn Provider, clock: &dyn Clock, message: &str) -> &ChatTurn {
        let asked_at = clock.now();
        let text = match provider.continue_chat(&self.history, message, &self.context).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "chat turn failed");
                CHAT_FAILURE_REPLY.to_string()
            }
        };

        self.history.push(ChatTurn {
            speaker: Speaker::User,
            text: message.to_string(),
            created_at: asked_at,
        });
        self.history.push(ChatTurn { speaker: Speaker::Assistant, text, created_at: clock.now() });
        &self.history[self.history.len() - 1]
    }
}
