use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Classification of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeStatus {
    /// The server answered; carries the final HTTP status code.
    Success(u16),
    Timeout,
    ConnectionFailure,
    RequestFailure,
    /// The probe never got to classify a network outcome.
    ExecutionFailure,
}

impl ProbeStatus {
    pub fn label(&self) -> String {
        match self {
            ProbeStatus::Success(code) => code.to_string(),
            ProbeStatus::Timeout => "Request Timeout".to_string(),
            ProbeStatus::ConnectionFailure => "Connection Error".to_string(),
            ProbeStatus::RequestFailure => "Request Error".to_string(),
            ProbeStatus::ExecutionFailure => "Execution Error".to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProbeStatus::Success(_))
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProbeStatus::Success(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub original: String,
    pub resolved: String,
    pub status: ProbeStatus,
    pub error: String,
    pub response_time: Duration,
}

impl Outcome {
    pub fn success(original: String, resolved: String, status_code: u16, response_time: Duration) -> Self {
        Self {
            original,
            resolved,
            status: ProbeStatus::Success(status_code),
            error: String::new(),
            response_time,
        }
    }

    pub fn failure(original: String, status: ProbeStatus, error: String, response_time: Duration) -> Self {
        Self {
            original,
            resolved: String::new(),
            status,
            error,
            response_time,
        }
    }

    pub fn execution_failure(original: String, error: String) -> Self {
        Self::failure(original, ProbeStatus::ExecutionFailure, error, Duration::from_secs(0))
    }
}

/// Outcomes of one batch, kept in the order the probes completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    outcomes: Vec<Outcome>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Outcome> {
        self.outcomes.iter()
    }

    pub fn into_outcomes(self) -> Vec<Outcome> {
        self.outcomes
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.outcomes.len(),
            ..BatchSummary::default()
        };

        for outcome in &self.outcomes {
            match outcome.status {
                ProbeStatus::Success(_) => summary.succeeded += 1,
                ProbeStatus::Timeout => summary.timed_out += 1,
                ProbeStatus::ConnectionFailure => summary.connection_failed += 1,
                ProbeStatus::RequestFailure => summary.request_failed += 1,
                ProbeStatus::ExecutionFailure => summary.execution_failed += 1,
            }
        }

        summary
    }
}

impl From<Vec<Outcome>> for BatchResult {
    fn from(outcomes: Vec<Outcome>) -> Self {
        Self { outcomes }
    }
}

impl IntoIterator for BatchResult {
    type Item = Outcome;
    type IntoIter = std::vec::IntoIter<Outcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a Outcome;
    type IntoIter = std::slice::Iter<'a, Outcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

/// Per-kind tallies of a [`BatchResult`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub timed_out: usize,
    pub connection_failed: usize,
    pub request_failed: usize,
    pub execution_failed: usize,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }
}
