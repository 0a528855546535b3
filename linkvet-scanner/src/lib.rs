pub mod dispatcher;
pub mod error;
pub mod normalize;
pub mod prober;
pub mod result;
pub mod transport;

pub use dispatcher::{Dispatcher, ProgressCallback};
pub use error::{ScanError, TransportError};
pub use normalize::normalize;
pub use prober::{ProbeConfig, Prober};
pub use result::{BatchResult, BatchSummary, Outcome, ProbeStatus};
pub use transport::{HttpTransport, Transport, TransportResponse};
