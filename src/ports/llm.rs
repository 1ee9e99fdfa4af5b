//! LLM transport port: one authenticated JSON POST per call.

use serde::{Deserialize, Serialize};

use super::PortFuture;
use crate::model::Credential;

/// How the credential is attached to the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <credential>`.
    Bearer,
    /// The credential as the value of a named header.
    Header(String),
}

/// A request to a provider endpoint.
///
/// The credential is skipped when serializing so it never reaches a cassette.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Full endpoint URL.
    pub url: String,
    /// How to attach the credential.
    pub auth: AuthScheme,
    /// The credential itself.
    #[serde(skip)]
    pub credential: Credential,
    /// JSON body.
    pub body: serde_json::Value,
}

/// Any HTTP response from the provider, successful or not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LlmResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
    /// Set when the status arrived but the body could not be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_error: Option<String>,
}

impl LlmResponse {
    /// A fully read response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into(), read_error: None }
    }

    /// A response whose body failed to arrive intact.
    #[must_use]
    pub fn unreadable(status: u16, error: impl Into<String>) -> Self {
        Self { status, body: String::new(), read_error: Some(error.into()) }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends provider requests.
pub trait LlmTransport: Send + Sync {
    /// Posts the request body and returns whatever response came back.
    ///
    /// # Errors
    ///
    /// Returns an error only when no HTTP response was obtained, such as a
    /// connect failure or a timeout before the status line. A body that
    /// breaks off after the status is an `LlmResponse` with `read_error`.
    fn send(&self, request: &LlmRequest) -> PortFuture<'_, LlmResponse>;
}
