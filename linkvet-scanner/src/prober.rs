use crate::error::{Result, TransportError};
use crate::normalize::normalize;
use crate::result::{Outcome, ProbeStatus};
use crate::transport::{HttpTransport, Transport};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const CONNECTION_ERROR_MESSAGE: &str = "could not connect to server";

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Fetches one address and turns whatever happened into an [`Outcome`].
#[derive(Clone)]
pub struct Prober {
    transport: Arc<dyn Transport>,
    config: ProbeConfig,
}

impl Prober {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let transport = HttpTransport::new()?;
        Ok(Self::with_transport(Arc::new(transport), ProbeConfig { timeout }))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, config: ProbeConfig) -> Self {
        Self { transport, config }
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    pub async fn probe(&self, address: &str) -> Outcome {
        let probe_url = normalize(address);
        debug!("Probing {} as {}", address, probe_url);

        let start = Instant::now();
        let response = self.transport.get(&probe_url, self.config.timeout).await;
        let response_time = start.elapsed();

        match response {
            Ok(response) => Outcome::success(
                address.to_string(),
                response.final_url,
                response.status,
                response_time,
            ),
            Err(TransportError::Timeout) => {
                warn!("Probe of {} timed out", address);
                Outcome::failure(
                    address.to_string(),
                    ProbeStatus::Timeout,
                    format!(
                        "response timed out after {} seconds",
                        self.config.timeout.as_secs_f64()
                    ),
                    response_time,
                )
            }
            Err(TransportError::Connect(detail)) => {
                warn!("Could not connect to {}: {}", address, detail);
                Outcome::failure(
                    address.to_string(),
                    ProbeStatus::ConnectionFailure,
                    CONNECTION_ERROR_MESSAGE.to_string(),
                    response_time,
                )
            }
            Err(TransportError::Request(detail)) => {
                warn!("Request to {} failed: {}", address, detail);
                Outcome::failure(
                    address.to_string(),
                    ProbeStatus::RequestFailure,
                    detail,
                    response_time,
                )
            }
        }
    }
}
