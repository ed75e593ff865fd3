use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

/// Connectivity check against a host, independent of any real request.
#[async_trait]
pub trait Reachability {
    async fn is_reachable(&self, url: &Url) -> bool;
}

/// Checks by opening (and immediately dropping) a TCP connection to the
/// URL's host and port.
pub struct TcpReachability {
    timeout: Duration,
}

impl TcpReachability {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Reachability for TcpReachability {
    async fn is_reachable(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let Some(port) = url.port_or_known_default() else {
            return false;
        };

        match timeout(self.timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!("{}:{} unreachable: {}", host, port, e);
                false
            }
            Err(_) => {
                tracing::debug!("{}:{} connect timed out", host, port);
                false
            }
        }
    }
}
