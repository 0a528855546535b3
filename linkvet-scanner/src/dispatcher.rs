use crate::error::{Result, ScanError};
use crate::prober::Prober;
use crate::result::{BatchResult, Outcome};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

/// Called once per finished probe with `(completed, total)`.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

pub const DEFAULT_CONCURRENCY: usize = 10;

/// Runs one probe per address on a bounded pool and collects the outcomes
/// in completion order.
pub struct Dispatcher {
    prober: Prober,
    concurrency: usize,
    progress_callback: Option<ProgressCallback>,
}

impl Dispatcher {
    pub fn new() -> Result<Self> {
        Ok(Self::with_prober(Prober::new()?))
    }

    pub fn with_prober(prober: Prober) -> Self {
        Self {
            prober,
            concurrency: DEFAULT_CONCURRENCY,
            progress_callback: None,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn run_batch(&self, addresses: &[String]) -> BatchResult {
        let total = addresses.len();
        if total == 0 {
            debug!("Empty batch, nothing to probe");
            return BatchResult::new();
        }

        info!(
            "Validating {} addresses with {} workers",
            total, self.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut in_flight = FuturesUnordered::new();

        for address in addresses {
            let prober = self.prober.clone();
            let semaphore = semaphore.clone();
            let task_address = address.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ScanError::Scheduling(e.to_string()))?;
                Ok::<Outcome, ScanError>(prober.probe(&task_address).await)
            });

            let address = address.clone();
            in_flight.push(async move { (address, handle.await) });
        }

        // Only this loop touches the results and the counter, so progress
        // events come out serialized and strictly increasing.
        let mut results = BatchResult::with_capacity(total);
        let mut completed = 0;

        while let Some((address, joined)) = in_flight.next().await {
            let outcome = match joined {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    warn!("Probe of {} could not be scheduled: {}", address, e);
                    Outcome::execution_failure(address, e.to_string())
                }
                Err(e) => {
                    let description = describe_join_error(e);
                    warn!("Probe of {} failed to run: {}", address, description);
                    Outcome::execution_failure(address, description)
                }
            };

            results.push(outcome);
            completed += 1;

            if let Some(ref callback) = self.progress_callback {
                callback(completed, total);
            }
        }

        info!("Batch complete. {} outcomes recorded", results.len());
        results
    }
}

fn describe_join_error(err: JoinError) -> String {
    if !err.is_panic() {
        return ScanError::JoinError(err).to_string();
    }

    let payload = err.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());

    format!("probe task panicked: {}", message)
}
