//! OpenAI chat-completions backend, shared by the OpenAI and custom variants.

use serde::Deserialize;
use serde_json::{json, Value};

use super::parse::parse_fenced_analysis;
use super::prompt::{
    analysis_prompt, chat_prompt, CHAT_SYSTEM_PROMPT, CONNECTION_TEST_PROMPT, EMPTY_CHAT_REPLY,
    JSON_ONLY_SUFFIX, SYSTEM_PROMPT,
};
use super::{Endpoint, Provider, ProviderFuture};
use crate::error::AnalysisError;
use crate::model::{AnalysisResult, ChatTurn, Credential, ProviderKind, SelectedFile, Speaker};
use crate::ports::AuthScheme;

/// A provider speaking the chat-completions protocol.
///
/// The OpenAI and custom variants differ only in how their base URL is
/// chosen; the factory handles that.
pub struct OpenAiCompatible {
    kind: ProviderKind,
    endpoint: Endpoint,
    model: String,
    base: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiCompatible {
    /// The hosted OpenAI variant.
    #[must_use]
    pub fn openai(endpoint: Endpoint, model: &str, base: &str) -> Self {
        Self::with_kind(ProviderKind::Openai, endpoint, model, base)
    }

    /// The custom variant, for self-hosted or third-party compatible endpoints.
    #[must_use]
    pub fn custom(endpoint: Endpoint, model: &str, base: &str) -> Self {
        Self::with_kind(ProviderKind::Custom, endpoint, model, base)
    }

    fn with_kind(kind: ProviderKind, endpoint: Endpoint, model: &str, base: &str) -> Self {
        Self { kind, endpoint, model: model.to_string(), base: base.to_string() }
    }

    /// Posts `messages` and returns the first choice's content, or `""`.
    async fn complete(&self, messages: Vec<Value>, json_mode: bool) -> Result<String, AnalysisError> {
        let mut body = json!({ "model": self.model, "messages": messages });
        if json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let raw = self
            .endpoint
            .post(format!("{}/chat/completions", self.base), AuthScheme::Bearer, body)
            .await?;
        let response: CompletionResponse =
            serde_json::from_str(&raw).map_err(|e| AnalysisError::MalformedResponse {
                reason: format!("unexpected chat-completions envelope: {e}"),
                raw: raw.clone(),
            })?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default())
    }
}

fn non_empty(text: String) -> Result<String, AnalysisError> {
    if text.trim().is_empty() {
        return Err(AnalysisError::MalformedResponse {
            reason: "Empty response from provider".into(),
            raw: text,
        });
    }
    Ok(text)
}

fn message(role: &str, content: &str) -> Value {
    json!({ "role": role, "content": content })
}

impl Provider for OpenAiCompatible {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn credential(&self) -> &Credential {
        self.endpoint.credential()
    }

    fn generate_artifact<'a>(
        &'a self,
        repo_name: &'a str,
        files: &'a [SelectedFile],
    ) -> ProviderFuture<'a, AnalysisResult> {
        Box::pin(async move {
            let messages = vec![
                message("system", &format!("{SYSTEM_PROMPT}{JSON_ONLY_SUFFIX}")),
                message("user", &analysis_prompt(repo_name, files)),
            ];
            let text = non_empty(self.complete(messages, true).await?)?;
            parse_fenced_analysis(&text)
        })
    }

    fn continue_chat<'a>(
        &'a self,
        history: &'a [ChatTurn],
        message_text: &'a str,
        context: &'a AnalysisResult,
    ) -> ProviderFuture<'a, String> {
        Box::pin(async move {
            let mut messages = Vec::with_capacity(history.len() + 2);
            messages.push(message("system", CHAT_SYSTEM_PROMPT));
            messages.extend(history.iter().map(|turn| {
                let role = match turn.speaker {
                    Speaker::User => "user",
                    Speaker::Assistant => "assistant",
                };
                message(role, &turn.text)
            }));
            messages.push(message("user", &chat_prompt(message_text, context)));

            let text = self.complete(messages, false).await?;
            if text.trim().is_empty() {
                Ok(EMPTY_CHAT_REPLY.to_string())
            } else {
                Ok(text)
            }
        })
    }

    fn ping(&self) -> ProviderFuture<'_, ()> {
        Box::pin(async move {
            let text = self.complete(vec![message("user", CONNECTION_TEST_PROMPT)], false).await?;
            non_empty(text).map(|_| ())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::live::HttpLlmTransport;
    use crate::model::{EntryKind, TreeEntry};
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    const PAYLOAD: &str = r#"{"dockerfile":"FROM node:20-alpine","dockerCompose":"services:\n  web:\n    build: .","readmeSummary":"A web app","instructions":"docker compose up","detectedDependencies":["express"],"healthCheckSuggestion":"wget -qO- localhost:3000"}"#;

    fn endpoint(key: &str) -> Endpoint {
        let transport = Arc::new(HttpLlmTransport::new(Duration::from_secs(5)).unwrap());
        Endpoint::new(transport, Credential::new(key), 0)
    }

    fn content_response(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
        }))
    }

    fn files() -> Vec<SelectedFile> {
        vec![SelectedFile {
            entry: TreeEntry {
                name: "package.json".into(),
                path: "package.json".into(),
                kind: EntryKind::File,
                content_url: None,
            },
            content: "{}".into(),
        }]
    }

    fn context() -> AnalysisResult {
        serde_json::from_str(PAYLOAD).unwrap()
    }

    #[tokio::test]
    async fn generate_uses_json_mode_and_strips_fences() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o",
                "response_format": { "type": "json_object" }
            })))
            .respond_with(content_response(&format!("```json\n{PAYLOAD}\n```")))
            .expect(1)
            .mount(&server)
            .await;

        let provider =
            OpenAiCompatible::openai(endpoint("sk-test"), "gpt-4o", &format!("{}/v1", server.uri()));
        let result = provider.generate_artifact("web", &files()).await.unwrap();
        assert_eq!(result.dockerfile, "FROM node:20-alpine");
        assert_eq!(result.detected_dependencies, vec!["express".to_string()]);
    }

    #[tokio::test]
    async fn custom_variant_posts_to_its_base() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat/completions"))
            .respond_with(content_response(PAYLOAD))
            .expect(1)
            .mount(&server)
            .await;

        let provider =
            OpenAiCompatible::custom(endpoint("local"), "llama3", &format!("{}/api", server.uri()));
        assert_eq!(provider.kind(), ProviderKind::Custom);
        assert!(provider.generate_artifact("web", &files()).await.is_ok());
    }

    #[tokio::test]
    async fn non_json_content_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(content_response("Sure! Here is your Dockerfile."))
            .mount(&server)
            .await;

        let provider = OpenAiCompatible::openai(endpoint("k"), "gpt-4o", &server.uri());
        let err = provider.generate_artifact("web", &files()).await.unwrap_err();
        match err {
            AnalysisError::MalformedResponse { raw, .. } => {
                assert_eq!(raw, "Sure! Here is your Dockerfile.");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_key_is_auth_and_server_error_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer wrong"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_api_key"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer right"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let provider = OpenAiCompatible::openai(endpoint("wrong"), "gpt-4o", &server.uri());
        let err = provider.generate_artifact("web", &files()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Auth(_)));

        let provider = OpenAiCompatible::openai(endpoint("right"), "gpt-4o", &server.uri());
        let err = provider.generate_artifact("web", &files()).await.unwrap_err();
        assert_eq!(err.to_string(), "Provider Error (503): overloaded");
    }

    #[tokio::test]
    async fn chat_sends_prior_turns_then_the_new_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(content_response("Use a redis:7 service."))
            .expect(1)
            .mount(&server)
            .await;

        let history = vec![
            ChatTurn { speaker: Speaker::User, text: "first".into(), created_at: Utc::now() },
            ChatTurn { speaker: Speaker::Assistant, text: "answer".into(), created_at: Utc::now() },
        ];
        let provider = OpenAiCompatible::openai(endpoint("k"), "gpt-4o", &server.uri());
        let reply = provider.continue_chat(&history, "add redis", &context()).await.unwrap();
        assert_eq!(reply, "Use a redis:7 service.");

        let requests: Vec<Request> = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let messages = body["messages"].as_array().unwrap();
        let roles: Vec<&str> = messages.iter().map(|m| m["role"].as_str().unwrap()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert!(body.get("response_format").is_none());
        let last = messages[3]["content"].as_str().unwrap();
        assert!(last.contains("FROM node:20-alpine"));
        assert!(last.contains("User Query: add redis"));
    }

    #[tokio::test]
    async fn connection_test_without_key_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(content_response("ok"))
            .expect(0)
            .mount(&server)
            .await;

        let provider = OpenAiCompatible::openai(endpoint(""), "gpt-4o", &server.uri());
        assert!(!provider.test_connection().await);
    }

    #[tokio::test]
    async fn connection_test_needs_a_non_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .expect(1)
            .mount(&server)
            .await;
        let provider = OpenAiCompatible::openai(endpoint("k"), "gpt-4o", &server.uri());
        assert!(!provider.test_connection().await);

        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(content_response("pong")).mount(&server).await;
        let provider = OpenAiCompatible::openai(endpoint("k"), "gpt-4o", &server.uri());
        assert!(provider.test_connection().await);
    }
}
