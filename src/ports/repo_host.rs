//! Repository host port: recursive tree listings and raw file content.

use serde::{Deserialize, Serialize};

use super::PortFuture;

/// One node of a recursive tree listing, as reported by the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeNode {
    /// Path relative to the repository root.
    pub path: String,
    /// Git object type (`blob`, `tree`, `commit`).
    #[serde(rename = "type")]
    pub kind: String,
}

/// A recursive tree listing for one branch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeListing {
    /// All nodes, in host order.
    pub tree: Vec<TreeNode>,
    /// Whether the host cut the listing short.
    #[serde(default)]
    pub truncated: bool,
}

/// Read-only access to a public repository host.
pub trait RepoHost: Send + Sync {
    /// Lists the full tree of `owner/name` at `branch`.
    ///
    /// # Errors
    ///
    /// Returns an error for any non-success status (not found, rate limited)
    /// or transport failure.
    fn list_tree<'a>(&'a self, owner: &'a str, name: &'a str, branch: &'a str)
        -> PortFuture<'a, TreeListing>;

    /// Downloads the raw text behind a content URL.
    ///
    /// # Errors
    ///
    /// Returns an error for any non-success status or transport failure.
    fn raw_file<'a>(&'a self, url: &'a str) -> PortFuture<'a, String>;
}
