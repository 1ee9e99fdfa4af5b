//! Recording adapter for the `RepoHost` port.

use std::sync::{Arc, Mutex};

use serde_json::json;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{PortFuture, RepoHost, TreeListing};

/// Records host interactions while delegating to an inner implementation.
pub struct RecordingRepoHost {
    inner: Box<dyn RepoHost>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingRepoHost {
    /// Creates a new recording host wrapping the given implementation.
    pub fn new(inner: Box<dyn RepoHost>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl RepoHost for RecordingRepoHost {
    fn list_tree<'a>(
        &'a self,
        owner: &'a str,
        name: &'a str,
        branch: &'a str,
    ) -> PortFuture<'a, TreeListing> {
        Box::pin(async move {
            let result = self.inner.list_tree(owner, name, branch).await;
            let input = json!({"owner": owner, "name": name, "branch": branch});
            record_result(&self.recorder, "host", "list_tree", &input, &result);
            result
        })
    }

    fn raw_file<'a>(&'a self, url: &'a str) -> PortFuture<'a, String> {
        Box::pin(async move {
            let result = self.inner.raw_file(url).await;
            record_result(&self.recorder, "host", "raw_file", &json!({"url": url}), &result);
            result
        })
    }
}
