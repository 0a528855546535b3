use crate::error::ValidateError;
use indicatif::{ProgressBar, ProgressStyle};
use linkvet_scanner::{
    BatchResult, Dispatcher, HttpTransport, ProbeConfig, Prober, ProgressCallback, Transport,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Options for configuring a validation run
pub struct ValidateOptions {
    pub addresses: Vec<String>,
    pub concurrency: usize,
    pub timeout: Duration,
    pub show_progress_bar: bool,
}

/// Callback for reporting validation progress as `(completed, total)`
pub type ValidateProgressCallback = ProgressCallback;

pub fn format_progress_message(completed: usize, total: usize) -> String {
    format!("Processing... ({}/{})", completed, total)
}

/// Execute a validation run against the network with the given options
pub async fn execute_validation(
    options: ValidateOptions,
    progress_callback: Option<ValidateProgressCallback>,
) -> Result<BatchResult, ValidateError> {
    let transport = Arc::new(HttpTransport::new()?);
    Ok(execute_validation_with_transport(options, transport, progress_callback).await)
}

/// Same as [`execute_validation`] over a caller-supplied transport
pub async fn execute_validation_with_transport(
    options: ValidateOptions,
    transport: Arc<dyn Transport>,
    progress_callback: Option<ValidateProgressCallback>,
) -> BatchResult {
    let ValidateOptions {
        addresses,
        concurrency,
        timeout,
        show_progress_bar,
    } = options;

    let total = addresses.len();
    let progress_bar = if show_progress_bar && total > 0 {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(format_progress_message(0, total));
        Some(Arc::new(pb))
    } else {
        None
    };

    let pb_clone = progress_bar.clone();
    let internal_callback: ProgressCallback = Arc::new(move |completed: usize, total: usize| {
        if let Some(ref pb) = pb_clone {
            pb.set_position(completed as u64);
            pb.set_message(format_progress_message(completed, total));
        }
        if let Some(ref callback) = progress_callback {
            callback(completed, total);
        }
    });

    let prober = Prober::with_transport(transport, ProbeConfig { timeout });
    let dispatcher = Dispatcher::with_prober(prober)
        .with_concurrency(concurrency)
        .with_progress_callback(internal_callback);

    let results = dispatcher.run_batch(&addresses).await;

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!(
            "Validation complete! {} addresses processed",
            results.len()
        ));
    }

    info!(
        "Validated {} addresses, {} responded",
        results.len(),
        results.summary().succeeded
    );

    results
}
