use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::TransportError;

/// Issues one HTTP GET and hands back the decoded JSON body.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn fetch(&self, url: &str, params: &[(&str, String)]) -> Result<Value, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str, params: &[(&str, String)]) -> Result<Value, TransportError> {
        debug!(url, "sending request");

        let res = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                message: e.without_url().to_string(),
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| TransportError::Request {
            url: url.to_string(),
            message: format!("failed to read response body: {}", e.without_url()),
        })?;

        debug!(url, status = status.as_u16(), bytes = body.len(), "received response");

        if !status.is_success() {
            warn!(url, status = status.as_u16(), "request was not successful");
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| TransportError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
