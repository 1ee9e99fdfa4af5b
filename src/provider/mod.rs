//! Provider adapters: one contract, three backends.
//!
//! [`build`] is the single place a [`ProviderConfig`] is turned into a
//! concrete backend. The credential fallback to environment variables is
//! resolved here once, so backends only ever see the effective credential.

pub mod gemini;
pub mod openai;
pub mod parse;
pub mod prompt;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::AnalysisError;
use crate::model::{
    AnalysisResult, ChatTurn, Credential, ProviderConfig, ProviderKind, SelectedFile,
};
use crate::ports::{AuthScheme, LlmRequest, LlmResponse, LlmTransport};

pub use gemini::GeminiProvider;
pub use openai::OpenAiCompatible;

/// Default endpoint base for the Gemini backend.
pub const GEMINI_DEFAULT_BASE: &str = "https://generativelanguage.googleapis.com";
/// Default endpoint base for the OpenAI backend.
pub const OPENAI_DEFAULT_BASE: &str = "https://api.openai.com/v1";

/// Boxed future returned by provider operations.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AnalysisError>> + Send + 'a>>;

/// The capability every backend offers.
pub trait Provider: Send + Sync {
    /// Which variant this is.
    fn kind(&self) -> ProviderKind;

    /// The model requests are sent to.
    fn model(&self) -> &str;

    /// The effective credential.
    fn credential(&self) -> &Credential;

    /// Produces the structured artifact for a repository from its selected files.
    fn generate_artifact<'a>(
        &'a self,
        repo_name: &'a str,
        files: &'a [SelectedFile],
    ) -> ProviderFuture<'a, AnalysisResult>;

    /// Answers a follow-up question. `history` holds the turns before `message`.
    fn continue_chat<'a>(
        &'a self,
        history: &'a [ChatTurn],
        message: &'a str,
        context: &'a AnalysisResult,
    ) -> ProviderFuture<'a, String>;

    /// Sends a minimal request and checks that it succeeds.
    fn ping(&self) -> ProviderFuture<'_, ()>;

    /// Returns whether a minimal request succeeds. Never errors.
    fn test_connection(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            if self.credential().is_empty() {
                warn!(provider = %self.kind(), "no credential configured; skipping connection test");
                return false;
            }
            match self.ping().await {
                Ok(()) => true,
                Err(e) => {
                    warn!(provider = %self.kind(), error = %e, "connection test failed");
                    false
                }
            }
        })
    }
}

/// Builds the backend for `config`, reading credential fallbacks from the
/// process environment.
///
/// # Errors
///
/// See [`build_with_env`].
pub fn build(
    config: &ProviderConfig,
    transport: Arc<dyn LlmTransport>,
    retries: u32,
) -> Result<Box<dyn Provider>, AnalysisError> {
    build_with_env(config, transport, retries, |key| std::env::var(key).ok())
}

/// Builds the backend for `config` with an explicit environment lookup.
///
/// # Errors
///
/// Returns `InvalidConfig` when the custom variant has no endpoint base.
pub fn build_with_env<F>(
    config: &ProviderConfig,
    transport: Arc<dyn LlmTransport>,
    retries: u32,
    env: F,
) -> Result<Box<dyn Provider>, AnalysisError>
where
    F: Fn(&str) -> Option<String>,
{
    let credential = effective_credential(config, &env);
    let endpoint = Endpoint { transport, credential, retries };
    let base = config
        .endpoint_base
        .as_deref()
        .map(|b| b.trim().trim_end_matches('/'))
        .filter(|b| !b.is_empty());

    debug!(provider = %config.provider, model = %config.model, "building provider");

    Ok(match config.provider {
        ProviderKind::Gemini => Box::new(GeminiProvider::new(
            endpoint,
            &config.model,
            base.unwrap_or(GEMINI_DEFAULT_BASE),
        )),
        ProviderKind::Openai => Box::new(OpenAiCompatible::openai(
            endpoint,
            &config.model,
            base.unwrap_or(OPENAI_DEFAULT_BASE),
        )),
        ProviderKind::Custom => {
            let base = base.ok_or_else(|| {
                AnalysisError::InvalidConfig(
                    "the custom provider needs an endpoint base URL (use --base-url)".into(),
                )
            })?;
            Box::new(OpenAiCompatible::custom(endpoint, &config.model, base))
        }
    })
}

fn effective_credential<F>(config: &ProviderConfig, env: &F) -> Credential
where
    F: Fn(&str) -> Option<String>,
{
    if !config.credential.is_empty() {
        return config.credential.clone();
    }
    let fallbacks: &[&str] = match config.provider {
        ProviderKind::Gemini => &["DOCKERIZE_API_KEY", "GEMINI_API_KEY", "API_KEY"],
        ProviderKind::Openai | ProviderKind::Custom => &["DOCKERIZE_API_KEY", "OPENAI_API_KEY"],
    };
    fallbacks
        .iter()
        .filter_map(|key| env(key))
        .map(Credential::new)
        .find(|c| !c.is_empty())
        .unwrap_or_default()
}

/// Authenticated POST shared by the backends, with status classification.
pub struct Endpoint {
    transport: Arc<dyn LlmTransport>,
    credential: Credential,
    retries: u32,
}

impl Endpoint {
    /// Creates an endpoint; `retries` counts extra attempts after a request
    /// that got no HTTP response.
    #[must_use]
    pub fn new(transport: Arc<dyn LlmTransport>, credential: Credential, retries: u32) -> Self {
        Self { transport, credential, retries }
    }

    /// The credential attached to requests.
    #[must_use]
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Posts `body` and returns the body of a 2xx response.
    ///
    /// # Errors
    ///
    /// `Auth` for a missing or rejected credential, `Provider` for any other
    /// non-success status or when no response arrived.
    pub async fn post(
        &self,
        url: String,
        auth: AuthScheme,
        body: serde_json::Value,
    ) -> Result<String, AnalysisError> {
        if self.credential.is_empty() {
            return Err(AnalysisError::Auth("no API key configured".into()));
        }

        let request = LlmRequest { url, auth, credential: self.credential.clone(), body };
        let mut attempt = 0;
        loop {
            match self.transport.send(&request).await {
                Ok(LlmResponse { status, read_error: Some(e), .. }) => {
                    return Err(AnalysisError::Provider {
                        status: Some(status),
                        body: self.credential.scrub(&e),
                    });
                }
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) => {
                    return Err(classify(response.status, &self.credential.scrub(&response.body)));
                }
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(attempt, error = %self.credential.scrub(&e.to_string()), "no response from provider, retrying");
                }
                Err(e) => {
                    return Err(AnalysisError::Provider {
                        status: None,
                        body: self.credential.scrub(&e.to_string()),
                    });
                }
            }
        }
    }
}

fn classify(status: u16, body: &str) -> AnalysisError {
    let rejected_key = status == 400 && body.contains("API_KEY_INVALID");
    if matches!(status, 401 | 403) || rejected_key {
        AnalysisError::Auth(format!("provider rejected the API key ({status}): {body}"))
    } else {
        AnalysisError::Provider { status: Some(status), body: body.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PortFuture;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Transport that pops scripted results and counts calls.
    struct Scripted {
        results: Mutex<VecDeque<Result<LlmResponse, String>>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(results: Vec<Result<LlmResponse, String>>) -> Arc<Self> {
            Arc::new(Self { results: Mutex::new(results.into()), calls: Mutex::new(0) })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl LlmTransport for Scripted {
        fn send(&self, _request: &LlmRequest) -> PortFuture<'_, LlmResponse> {
            *self.calls.lock().unwrap() += 1;
            let next = self.results.lock().unwrap().pop_front().expect("script exhausted");
            Box::pin(async move { next.map_err(Into::into) })
        }
    }

    fn config(provider: ProviderKind, key: &str, base: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            provider,
            credential: Credential::new(key),
            model: "m".into(),
            endpoint_base: base.map(str::to_string),
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn explicit_credential_beats_environment() {
        let env = |key: &str| (key == "OPENAI_API_KEY").then(|| "env-key".to_string());
        let cfg = config(ProviderKind::Openai, "explicit", None);
        assert_eq!(effective_credential(&cfg, &env).expose(), "explicit");

        let cfg = config(ProviderKind::Openai, "", None);
        assert_eq!(effective_credential(&cfg, &env).expose(), "env-key");
    }

    #[test]
    fn gemini_falls_back_through_its_variables() {
        let env = |key: &str| (key == "API_KEY").then(|| "plain".to_string());
        let cfg = config(ProviderKind::Gemini, "", None);
        assert_eq!(effective_credential(&cfg, &env).expose(), "plain");

        let env = |key: &str| match key {
            "DOCKERIZE_API_KEY" => Some("tool".to_string()),
            "GEMINI_API_KEY" => Some("gemini".to_string()),
            _ => None,
        };
        assert_eq!(effective_credential(&cfg, &env).expose(), "tool");
    }

    #[test]
    fn custom_without_base_is_invalid_config() {
        let transport = Scripted::new(vec![]);
        let result = build_with_env(&config(ProviderKind::Custom, "k", None), transport, 0, no_env);
        assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn factory_selects_variant_by_kind() {
        let transport: Arc<dyn LlmTransport> = Scripted::new(vec![]);
        for (kind, base) in [
            (ProviderKind::Gemini, None),
            (ProviderKind::Openai, None),
            (ProviderKind::Custom, Some("http://localhost:11434/v1/")),
        ] {
            let provider =
                build_with_env(&config(kind, "k", base), Arc::clone(&transport), 0, no_env)
                    .unwrap();
            assert_eq!(provider.kind(), kind);
            assert_eq!(provider.model(), "m");
        }
    }

    #[tokio::test]
    async fn empty_credential_fails_before_any_request() {
        let transport = Scripted::new(vec![]);
        let endpoint = Endpoint::new(transport.clone(), Credential::default(), 1);
        let err = endpoint
            .post("http://x".into(), AuthScheme::Bearer, serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Auth(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn retries_only_when_no_response_arrived() {
        let transport = Scripted::new(vec![
            Err("connection reset".into()),
            Ok(LlmResponse::new(200, "ok")),
        ]);
        let endpoint = Endpoint::new(transport.clone(), Credential::new("k"), 1);
        let body = endpoint
            .post("http://x".into(), AuthScheme::Bearer, serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(body, "ok");
        assert_eq!(transport.calls(), 2);

        let transport = Scripted::new(vec![Ok(LlmResponse::new(500, "boom"))]);
        let endpoint = Endpoint::new(transport.clone(), Credential::new("k"), 1);
        let err = endpoint
            .post("http://x".into(), AuthScheme::Bearer, serde_json::json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Provider Error (500): boom");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn unreadable_body_is_not_retried() {
        let transport = Scripted::new(vec![
            Ok(LlmResponse::unreadable(200, "failed to read response: k in body")),
            Ok(LlmResponse::new(200, "ok")),
        ]);
        let endpoint = Endpoint::new(transport.clone(), Credential::new("k in body"), 1);
        let err = endpoint
            .post("http://x".into(), AuthScheme::Bearer, serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Provider { status: Some(200), .. }));
        assert!(!err.to_string().contains("k in body"));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_report_missing_status() {
        let transport = Scripted::new(vec![Err("timed out".into()), Err("timed out".into())]);
        let endpoint = Endpoint::new(transport, Credential::new("k"), 1);
        let err = endpoint
            .post("http://x".into(), AuthScheme::Bearer, serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Provider { status: None, .. }));
    }

    #[test]
    fn classify_maps_rejected_keys_to_auth() {
        assert!(matches!(classify(401, "nope"), AnalysisError::Auth(_)));
        assert!(matches!(classify(403, "nope"), AnalysisError::Auth(_)));
        assert!(matches!(
            classify(400, r#"{"error":{"details":[{"reason":"API_KEY_INVALID"}]}}"#),
            AnalysisError::Auth(_)
        ));
        assert!(matches!(
            classify(400, "bad request"),
            AnalysisError::Provider { status: Some(400), .. }
        ));
    }

    #[tokio::test]
    async fn rejected_body_is_scrubbed_of_the_credential() {
        let transport = Scripted::new(vec![Ok(LlmResponse::new(
            401,
            "Incorrect API key provided: sk-live-123",
        ))]);
        let endpoint = Endpoint::new(transport, Credential::new("sk-live-123"), 0);
        let err = endpoint
            .post("http://x".into(), AuthScheme::Bearer, serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(!err.to_string().contains("sk-live-123"));
    }
}
