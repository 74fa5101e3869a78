use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{Lookup, LookupError, LookupRequest};

#[derive(Deserialize)]
struct LookupResponse {
    message: serde_json::Value,
}

/// Calls the lookup REST endpoint with a JSON POST.
pub struct HttpLookup {
    url: String,
    client: reqwest::Client,
}

impl HttpLookup {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Lookup for HttpLookup {
    async fn lookup(&self, request: &LookupRequest) -> Result<String, LookupError> {
        debug!(url = %self.url, action = %request.action, "sending lookup");

        let resp = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| LookupError::Transport(Box::new(e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LookupError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: LookupResponse = resp
            .json()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        // Some tools answer with structured JSON rather than text.
        Ok(match body.message {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
    }
}
