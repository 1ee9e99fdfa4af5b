//! Replaying adapter for the `RepoHost` port.

use std::sync::Mutex;

use serde_json::json;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{PortFuture, RepoHost, TreeListing};

/// Serves recorded tree listings and file contents from a cassette.
///
/// Outputs are taken when the call is made, not when the future is polled.
/// File contents are matched by URL since concurrent fetches are recorded
/// in completion order.
pub struct ReplayingRepoHost {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingRepoHost {
    /// Create a replaying host backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl RepoHost for ReplayingRepoHost {
    fn list_tree<'a>(
        &'a self,
        _owner: &'a str,
        _name: &'a str,
        _branch: &'a str,
    ) -> PortFuture<'a, TreeListing> {
        let output = next_output(&self.replayer, "host", "list_tree");
        Box::pin(async move { replay_result(output, "host::list_tree") })
    }

    fn raw_file<'a>(&'a self, url: &'a str) -> PortFuture<'a, String> {
        let output = {
            let mut guard = self.replayer.lock().expect("replayer lock poisoned");
            guard.next_matching("host", "raw_file", &json!({ "url": url })).output.clone()
        };
        Box::pin(async move { replay_result(output, "host::raw_file") })
    }
}
