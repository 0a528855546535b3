use crate::error::{Result, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Browser identity sent with every probe. Some hosts answer bots differently.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 11.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";

/// Redirect hops followed before the request is treated as failed.
pub const MAX_REDIRECTS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// URL after all redirects were followed.
    pub final_url: String,
    pub status: u16,
}

/// One HTTP GET with redirect following and a per-request deadline.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        timeout: Duration,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_user_agent(BROWSER_USER_AGENT)
    }

    pub fn with_user_agent(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        timeout: Duration,
    ) -> std::result::Result<TransportResponse, TransportError> {
        debug!("GET {} (timeout {:?})", url, timeout);

        let response = self.client.get(url).timeout(timeout).send().await?;

        Ok(TransportResponse {
            final_url: response.url().to_string(),
            status: response.status().as_u16(),
        })
    }
}
