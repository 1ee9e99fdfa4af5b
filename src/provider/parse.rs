//! Validation boundary between provider text and [`AnalysisResult`].

use crate::error::AnalysisError;
use crate::model::AnalysisResult;

/// Strips a surrounding fenced code block (optionally tagged `json`).
///
/// Input without a fence comes back trimmed and otherwise unchanged.
#[must_use]
pub fn unfence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parses text that must already be the bare JSON object.
///
/// # Errors
///
/// Returns `MalformedResponse` when the text is not the expected shape or
/// carries an empty Dockerfile.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, AnalysisError> {
    validate(text, text)
}

/// Un-fences `text`, then parses it.
///
/// # Errors
///
/// Same as [`parse_analysis`]; the error keeps the original text.
pub fn parse_fenced_analysis(text: &str) -> Result<AnalysisResult, AnalysisError> {
    validate(unfence(text), text)
}

fn validate(json: &str, raw: &str) -> Result<AnalysisResult, AnalysisError> {
    let result: AnalysisResult = serde_json::from_str(json).map_err(|e| {
        AnalysisError::MalformedResponse {
            reason: format!("Failed to parse JSON response from LLM: {e}"),
            raw: raw.to_string(),
        }
    })?;

    if result.dockerfile.trim().is_empty() {
        return Err(AnalysisError::MalformedResponse {
            reason: "response did not include a Dockerfile".into(),
            raw: raw.to_string(),
        });
    }
    Ok(result)
}
