//! Live adapter for the `LlmTransport` port over HTTPS.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::ports::{AuthScheme, LlmRequest, LlmResponse, LlmTransport, PortError, PortFuture};

/// Posts provider requests with `reqwest`.
pub struct HttpLlmTransport {
    client: Client,
}

impl HttpLlmTransport {
    /// Creates a transport with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(super::USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl LlmTransport for HttpLlmTransport {
    fn send(&self, request: &LlmRequest) -> PortFuture<'_, LlmResponse> {
        let request = request.clone();

        Box::pin(async move {
            debug!(url = %request.url, "sending provider request");

            let builder = self.client.post(&request.url).json(&request.body);
            let builder = match &request.auth {
                AuthScheme::Bearer => builder.bearer_auth(request.credential.expose()),
                AuthScheme::Header(name) => {
                    builder.header(name.as_str(), request.credential.expose())
                }
            };

            let response = builder
                .send()
                .await
                .map_err(|e| -> PortError { format!("request failed: {}", e.without_url()).into() })?;

            let status = response.status().as_u16();
            match response.text().await {
                Ok(body) => {
                    debug!(status, bytes = body.len(), "provider responded");
                    Ok(LlmResponse::new(status, body))
                }
                Err(e) => {
                    warn!(status, "provider response body could not be read");
                    Ok(LlmResponse::unreadable(status, format!("failed to read response: {e}")))
                }
            }
        })
    }
}
