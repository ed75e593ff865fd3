pub mod http_transport;
pub mod reachability;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

pub use http_transport::HttpTransport;
pub use reachability::{Reachability, TcpReachability};

/// Request parameters, sent as query string (GET) or form body (POST).
pub type Params = BTreeMap<String, String>;

/// Whatever the service answered.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// JSON object body, when the service sent one
    pub body: Option<Map<String, Value>>,
}

impl TransportResponse {
    pub fn new(status: u16) -> Self {
        Self { status, body: None }
    }
}

/// No response object was produced at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    TimedOut,

    #[error("request failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait Transport {
    async fn get(&self, url: &Url, params: &Params) -> Result<TransportResponse, TransportError>;

    async fn post(&self, url: &Url, params: &Params) -> Result<TransportResponse, TransportError>;
}
