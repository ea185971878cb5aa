//! Page weight measurement.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use climacode_core::ScanConfig;
use reqwest::{header, Client, ClientBuilder};
use tracing::debug;

/// Measures the transfer size of a page.
#[async_trait]
pub trait PageSizer: Send + Sync {
    /// Bytes transferred for `url`. Errors mean the page could not be measured.
    async fn measure(&self, url: &str) -> Result<u64>;
}

/// Fetches the page over HTTP and counts its bytes.
pub struct HttpPageSizer {
    client: Client,
}

impl HttpPageSizer {
    /// Client with the configured user agent and timeout.
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(Duration::from_secs(config.fetch_timeout_secs))
                .user_agent(config.user_agent.clone())
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl PageSizer for HttpPageSizer {
    async fn measure(&self, url: &str) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        // Error pages still cost bytes to serve.
        let status = response.status();
        let declared = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;

        let bytes = (body.len() as u64).max(declared);
        debug!(
            "Measured {} at {} bytes (status {}, body {}, header {})",
            url,
            bytes,
            status,
            body.len(),
            declared
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sizer() -> HttpPageSizer {
        HttpPageSizer::new(&ScanConfig::default())
    }

    #[tokio::test]
    async fn test_counts_body_and_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header_eq("user-agent", "ClimaCode Carbon Scanner/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(4096)))
            .mount(&server)
            .await;

        let bytes = sizer().measure(&format!("{}/", server.uri())).await.unwrap();
        assert_eq!(bytes, 4096);
    }

    #[tokio::test]
    async fn test_error_page_is_still_measured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down for maintenance"))
            .mount(&server)
            .await;

        assert_eq!(sizer().measure(&server.uri()).await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        // Port 9 (discard) on localhost is not served.
        assert!(sizer().measure("http://127.0.0.1:9/").await.is_err());
    }
}
