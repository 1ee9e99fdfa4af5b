//! Replaying adapters that serve recorded interactions.

pub mod clock;
pub mod llm;
pub mod repo_host;

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::PortError;

pub use clock::ReplayingClock;
pub use llm::ReplayingLlmTransport;
pub use repo_host::ReplayingRepoHost;

/// Pull the next recorded output for `port::method`.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> serde_json::Value {
    let mut guard = replayer.lock().expect("replayer lock poisoned");
    guard.next_interaction(port, method).output.clone()
}

/// Decode a recorded `Result` using the `{"ok": v}` / `{"err": msg}` convention.
///
/// # Panics
///
/// Panics if the recorded value does not deserialize into `T`; a cassette
/// that no longer matches the code is a test bug.
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: serde_json::Value,
    context: &str,
) -> Result<T, PortError> {
    if let Some(err) = output.get("err") {
        let msg = err.as_str().unwrap_or("unknown error").to_string();
        return Err(msg.into());
    }
    let value = output.get("ok").cloned().unwrap_or(output);
    Ok(serde_json::from_value(value)
        .unwrap_or_else(|e| panic!("{context}: recorded output has the wrong shape: {e}")))
}

#[cfg(test)]
pub(crate) fn replayer_from(
    interactions: Vec<crate::cassette::format::Interaction>,
) -> CassetteReplayer {
    let cassette = crate::cassette::format::Cassette {
        name: "test".into(),
        recorded_at: chrono::Utc::now(),
        tool_version: "0.1.0".into(),
        interactions,
    };
    CassetteReplayer::new(&cassette)
}
