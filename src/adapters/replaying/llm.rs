//! Replaying adapter for the `LlmTransport` port.

use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{LlmRequest, LlmResponse, LlmTransport, PortFuture};

/// Serves recorded provider responses from a cassette.
pub struct ReplayingLlmTransport {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingLlmTransport {
    /// Create a replaying transport backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl LlmTransport for ReplayingLlmTransport {
    fn send(&self, _request: &LlmRequest) -> PortFuture<'_, LlmResponse> {
        let output = next_output(&self.replayer, "llm", "send");
        Box::pin(async move { replay_result(output, "llm::send") })
    }
}
