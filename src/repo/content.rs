//! Content fetcher: downloads selected files concurrently.

use futures::future::join_all;
use tracing::warn;

use crate::model::{SelectedFile, TreeEntry};
use crate::ports::RepoHost;

/// Fetches every entry's content concurrently and waits for all of them.
///
/// A failed fetch, or an entry without a content URL, yields empty content
/// for that entry only. Output order matches input order.
pub async fn fetch_all(host: &dyn RepoHost, selected: Vec<TreeEntry>) -> Vec<SelectedFile> {
    join_all(selected.into_iter().map(|entry| fetch_one(host, entry))).await
}

async fn fetch_one(host: &dyn RepoHost, entry: TreeEntry) -> SelectedFile {
    let Some(url) = entry.content_url.as_deref() else {
        return SelectedFile { entry, content: String::new() };
    };

    let content = match host.raw_file(url).await {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %entry.path, error = %e, "content fetch failed, continuing with empty file");
            String::new()
        }
    };
    SelectedFile { entry, content }
}
