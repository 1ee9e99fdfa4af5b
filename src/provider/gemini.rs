//! Gemini backend using `generateContent` with schema-constrained JSON output.

use serde::Deserialize;
use serde_json::{json, Value};

use super::parse::parse_analysis;
use super::prompt::{
    analysis_prompt, chat_prompt, CHAT_SYSTEM_PROMPT, CONNECTION_TEST_PROMPT, EMPTY_CHAT_REPLY,
    SYSTEM_PROMPT,
};
use super::{Endpoint, Provider, ProviderFuture};
use crate::error::AnalysisError;
use crate::model::{AnalysisResult, ChatTurn, Credential, ProviderKind, SelectedFile, Speaker};
use crate::ports::AuthScheme;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// The Gemini provider.
pub struct GeminiProvider {
    endpoint: Endpoint,
    model: String,
    base: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiProvider {
    /// Creates a provider posting to `base` (no trailing slash).
    #[must_use]
    pub fn new(endpoint: Endpoint, model: &str, base: &str) -> Self {
        Self { endpoint, model: model.to_string(), base: base.to_string() }
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base, self.model)
    }

    /// Posts a request and returns the concatenated text of the first candidate.
    async fn generate(&self, body: Value) -> Result<String, AnalysisError> {
        let raw = self
            .endpoint
            .post(self.url(), AuthScheme::Header(API_KEY_HEADER.into()), body)
            .await?;
        let response: GenerateContentResponse =
            serde_json::from_str(&raw).map_err(|e| AnalysisError::MalformedResponse {
                reason: format!("unexpected Gemini response envelope: {e}"),
                raw: raw.clone(),
            })?;

        Ok(response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default())
    }
}

/// Schema enforced server-side: six fields, all required.
fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "dockerfile": { "type": "STRING", "description": "The complete content of the Dockerfile." },
            "dockerCompose": { "type": "STRING", "description": "The complete content of the docker-compose.yml file." },
            "readmeSummary": { "type": "STRING", "description": "A brief summary of what the repository does." },
            "instructions": { "type": "STRING", "description": "Step-by-step instructions to build and run the container." },
            "detectedDependencies": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Key dependencies detected, such as CUDA, PyTorch or TensorFlow."
            },
            "healthCheckSuggestion": { "type": "STRING", "description": "A suggested health check." }
        },
        "required": [
            "dockerfile",
            "dockerCompose",
            "readmeSummary",
            "instructions",
            "detectedDependencies",
            "healthCheckSuggestion"
        ]
    })
}

fn user_content(text: &str) -> Value {
    json!({ "role": "user", "parts": [{ "text": text }] })
}

impl Provider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
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
            let body = json!({
                "systemInstruction": { "parts": [{ "text": SYSTEM_PROMPT }] },
                "contents": [user_content(&analysis_prompt(repo_name, files))],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": response_schema(),
                },
            });

            let text = self.generate(body).await?;
            if text.trim().is_empty() {
                return Err(AnalysisError::MalformedResponse {
                    reason: "Empty response from Gemini".into(),
                    raw: text,
                });
            }
            parse_analysis(&text)
        })
    }

    fn continue_chat<'a>(
        &'a self,
        history: &'a [ChatTurn],
        message: &'a str,
        context: &'a AnalysisResult,
    ) -> ProviderFuture<'a, String> {
        Box::pin(async move {
            let mut contents: Vec<Value> = history
                .iter()
                .map(|turn| {
                    let role = match turn.speaker {
                        Speaker::User => "user",
                        Speaker::Assistant => "model",
                    };
                    json!({ "role": role, "parts": [{ "text": turn.text }] })
                })
                .collect();
            contents.push(user_content(&chat_prompt(message, context)));

            let body = json!({
                "systemInstruction": { "parts": [{ "text": CHAT_SYSTEM_PROMPT }] },
                "contents": contents,
            });

            let text = self.generate(body).await?;
            if text.trim().is_empty() {
                Ok(EMPTY_CHAT_REPLY.to_string())
            } else {
                Ok(text)
            }
        })
    }

    fn ping(&self) -> ProviderFuture<'_, ()> {
        Box::pin(async move {
            let body = json!({ "contents": [user_content(CONNECTION_TEST_PROMPT)] });
            self.generate(body).await.map(|_| ())
        })
    }
}
