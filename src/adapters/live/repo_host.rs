//! Live adapter for the `RepoHost` port using the GitHub REST API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::ports::{PortError, PortFuture, RepoHost, TreeListing};

/// Public GitHub API base.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Public base for raw file downloads.
pub const GITHUB_RAW_BASE: &str = "https://raw.githubusercontent.com";

/// Reads trees and raw files from GitHub without authentication.
pub struct GitHubHost {
    client: Client,
    api_base: String,
}

impl GitHubHost {
    /// Creates a host client against `api_base` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(super::USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, api_base: api_base.trim_end_matches('/').to_string() })
    }

    fn tree_url(&self, owner: &str, name: &str, branch: &str) -> String {
        format!("{}/repos/{owner}/{name}/git/trees/{branch}?recursive=1", self.api_base)
    }
}

fn describe_status(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "repository or branch not found",
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            "rate limit exceeded or access denied"
        }
        _ => "unexpected status",
    }
}

impl RepoHost for GitHubHost {
    fn list_tree<'a>(
        &'a self,
        owner: &'a str,
        name: &'a str,
        branch: &'a str,
    ) -> PortFuture<'a, TreeListing> {
        Box::pin(async move {
            let url = self.tree_url(owner, name, branch);
            debug!(%url, "listing repository tree");

            let response = self
                .client
                .get(&url)
                .header("Accept", "application/vnd.github+json")
                .send()
                .await
                .map_err(|e| -> PortError { format!("tree request failed: {e}").into() })?;

            let status = response.status();
            if !status.is_success() {
                return Err(format!(
                    "GitHub API returned {} for branch {branch}: {}",
                    status.as_u16(),
                    describe_status(status)
                )
                .into());
            }

            response
                .json::<TreeListing>()
                .await
                .map_err(|e| -> PortError { format!("failed to parse tree listing: {e}").into() })
        })
    }

    fn raw_file<'a>(&'a self, url: &'a str) -> PortFuture<'a, String> {
        Box::pin(async move {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(format!("raw fetch of {url} returned {}", status.as_u16()).into());
            }
            Ok(response.text().await?)
        })
    }
}
