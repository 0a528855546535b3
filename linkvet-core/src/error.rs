use linkvet_scanner::ScanError;
use std::path::PathBuf;
use thiserror::Error;

/// Pre-flight failures while reading the address list. Any of these aborts
/// the run before a single probe is scheduled.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed input {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load env file {}: {source}", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

#[derive(Error, Debug)]
pub enum ValidateError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Scan(#[from] ScanError),
}
