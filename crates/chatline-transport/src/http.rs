//! HTTP implementation of the secondary transport.
//!
//! Sends `GET <endpoint>?message=<content>` and expects one JSON envelope
//! in the body.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;
use url::Url;

use chatline_core::prelude::*;
use chatline_core::MessageEnvelope;

use crate::secondary::SecondaryTransport;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Query parameter carrying the user's text.
const MESSAGE_PARAM: &str = "message";

/// HTTP client used as the secondary transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Build a transport for `endpoint` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the underlying client cannot be built.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl SecondaryTransport for HttpTransport {
    async fn request(&self, envelope: &MessageEnvelope) -> Result<MessageEnvelope> {
        debug!("HTTP: GET {} ({} chars)", self.endpoint, envelope.content.len());

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[(MESSAGE_PARAM, envelope.content.as_str())])
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP: request failed with status {}", status);
            return Err(Error::http_status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response body: {e}")))?;

        MessageEnvelope::decode(&body)
    }
}
