//! Recording adapter for the `LlmTransport` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{LlmRequest, LlmResponse, LlmTransport, PortFuture};

/// Records provider exchanges while delegating to an inner transport.
///
/// The request is recorded through its `Serialize` impl, which omits the
/// credential.
pub struct RecordingLlmTransport {
    inner: Box<dyn LlmTransport>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingLlmTransport {
    /// Creates a new recording transport wrapping the given implementation.
    pub fn new(inner: Box<dyn LlmTransport>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl LlmTransport for RecordingLlmTransport {
    fn send(&self, request: &LlmRequest) -> PortFuture<'_, LlmResponse> {
        let request = request.clone();

        Box::pin(async move {
            let result = self.inner.send(&request).await;
            record_result(&self.recorder, "llm", "send", &request, &result);
            result
        })
    }
}
