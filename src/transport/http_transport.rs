use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use url::Url;

use crate::app::Result;
use crate::transport::{Params, Transport, TransportError, TransportResponse};

pub const DEFAULT_USER_AGENT: &str = concat!("readlater/", env!("CARGO_PKG_VERSION"));

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    async fn send(&self, request: RequestBuilder) -> std::result::Result<TransportResponse, TransportError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::TimedOut
            } else {
                TransportError::Failed(e.to_string())
            }
        })?;

        let status = response.status().as_u16();

        // The body is informational only; the status code decides the outcome.
        let body = match response.bytes().await {
            Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(Value::Object(map)) => Some(map),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!("Response body is not JSON: {}", e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read response body: {}", e);
                None
            }
        };

        Ok(TransportResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url, params: &Params) -> std::result::Result<TransportResponse, TransportError> {
        tracing::debug!("GET {}", url);
        self.send(self.client.get(url.clone()).query(params)).await
    }

    async fn post(&self, url: &Url, params: &Params) -> std::result::Result<TransportResponse, TransportError> {
        tracing::debug!("POST {}", url);
        self.send(self.client.post(url.clone()).form(params)).await
    }
}
