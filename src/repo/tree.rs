//! Tree fetcher: probes candidate branches and lists the repository tree.

use tracing::{debug, info, warn};

use crate::error::AnalysisError;
use crate::model::{EntryKind, RepositoryRef, TreeEntry};
use crate::ports::{RepoHost, TreeNode};

/// Branch names probed in order; the first one with a listing wins.
pub const CANDIDATE_BRANCHES: [&str; 2] = ["main", "master"];

/// Lists the full tree of `repo`, confirming its branch.
///
/// On success `repo.branch` is set to the winning candidate. It is left
/// untouched on failure.
///
/// # Errors
///
/// Returns `TreeUnavailable` when no candidate branch can be listed, with
/// the last host error attached as the cause.
pub async fn fetch_tree(
    host: &dyn RepoHost,
    raw_base: &str,
    repo: &mut RepositoryRef,
) -> Result<Vec<TreeEntry>, AnalysisError> {
    let mut last_cause = String::from("no candidate branches");

    for branch in CANDIDATE_BRANCHES {
        match host.list_tree(&repo.owner, &repo.name, branch).await {
            Ok(listing) => {
                if listing.truncated {
                    warn!(repo = %repo.slug(), branch, "tree listing was truncated by the host");
                }
                info!(repo = %repo.slug(), branch, nodes = listing.tree.len(), "tree fetched");
                repo.branch = Some(branch.to_string());
                let repo: &RepositoryRef = repo;
                return Ok(listing
                    .tree
                    .into_iter()
                    .map(|node| to_entry(node, raw_base, repo, branch))
                    .collect());
            }
            Err(e) => {
                debug!(repo = %repo.slug(), branch, error = %e, "branch probe failed");
                last_cause = e.to_string();
            }
        }
    }

    Err(AnalysisError::TreeUnavailable {
        repo: repo.slug(),
        tried: CANDIDATE_BRANCHES.join(", "),
        cause: last_cause,
    })
}

/// Raw-content URL for a file, a pure function of repository, branch and path.
#[must_use]
pub fn content_url(raw_base: &str, repo: &RepositoryRef, branch: &str, path: &str) -> String {
    format!("{}/{}/{}/{branch}/{path}", raw_base.trim_end_matches('/'), repo.owner, repo.name)
}

fn to_entry(node: TreeNode, raw_base: &str, repo: &RepositoryRef, branch: &str) -> TreeEntry {
    let name = node.path.rsplit('/').next().unwrap_or(&node.path).to_string();
    if node.kind == "blob" {
        let url = content_url(raw_base, repo, branch, &node.path);
        TreeEntry { name, path: node.path, kind: EntryKind::File, content_url: Some(url) }
    } else {
        TreeEntry { name, path: node.path, kind: EntryKind::Directory, content_url: None }
    }
}
