//! Parses repository URLs into owner and name.

use url::Url;

use crate::error::AnalysisError;
use crate::model::RepositoryRef;

/// Parses `url` into a [`RepositoryRef`] with an unconfirmed branch.
///
/// The first two non-empty path segments become owner and name; anything
/// after them (`/tree/dev/src`, ...) is ignored.
///
/// # Errors
///
/// Returns `InvalidUrl` for anything that is not an absolute URL with at
/// least two non-empty path segments.
pub fn locate(url: &str) -> Result<RepositoryRef, AnalysisError> {
    let trimmed = url.trim();
    let parsed = Url::parse(trimmed).map_err(|_| AnalysisError::InvalidUrl(trimmed.to_string()))?;

    let mut segments = parsed
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty());

    match (segments.next(), segments.next()) {
        (Some(owner), Some(name)) => Ok(RepositoryRef {
            owner: owner.to_string(),
            name: name.to_string(),
            branch: None,
            source_url: trimmed.to_string(),
        }),
        _ => Err(AnalysisError::InvalidUrl(trimmed.to_string())),
    }
}
