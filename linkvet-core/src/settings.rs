// Runtime configuration: compiled defaults, then .env, then CLI overrides

use crate::error::SettingsError;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const REQUEST_COLUMN_KEY: &str = "REQUEST_COLUMN";
pub const REQUEST_TIMEOUT_KEY: &str = "REQUEST_TIMEOUT";
pub const MAX_THREADS_KEY: &str = "MAX_THREADS";

/// Header the address column carries in the spreadsheets this tool grew up on.
pub const DEFAULT_REQUEST_COLUMN: &str = "요청 주소";
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 10;
pub const DEFAULT_MAX_THREADS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub request_column: String,
    /// Per-probe deadline, in seconds.
    pub request_timeout: u64,
    pub max_threads: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            request_column: DEFAULT_REQUEST_COLUMN.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_threads: DEFAULT_MAX_THREADS,
        }
    }
}

impl Settings {
    /// Load settings from the process environment after applying an env file.
    ///
    /// With an explicit `env_file` the file must exist. Without one, a `.env`
    /// in the working directory (or any parent) is used when present. Values
    /// from the file override variables already set in the process.
    pub fn load(env_file: Option<&Path>) -> Result<Self, SettingsError> {
        match env_file {
            Some(path) => {
                dotenvy::from_path_override(path).map_err(|source| SettingsError::EnvFile {
                    path: path.to_path_buf(),
                    source,
                })?;
                debug!("Loaded settings from {}", path.display());
            }
            None => match dotenvy::dotenv_override() {
                Ok(path) => debug!("Loaded settings from {}", path.display()),
                Err(e) if e.not_found() => debug!("No .env file found, using defaults"),
                Err(source) => {
                    return Err(SettingsError::EnvFile {
                        path: ".env".into(),
                        source,
                    });
                }
            },
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Unset or blank keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let value_of = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(column) = value_of(REQUEST_COLUMN_KEY) {
            settings.request_column = column;
        }
        if let Some(raw) = value_of(REQUEST_TIMEOUT_KEY) {
            settings.request_timeout = parse_positive(REQUEST_TIMEOUT_KEY, &raw)?;
        }
        if let Some(raw) = value_of(MAX_THREADS_KEY) {
            settings.max_threads = parse_positive(MAX_THREADS_KEY, &raw)?;
        }

        Ok(settings)
    }

    pub fn with_request_column(mut self, column: impl Into<String>) -> Self {
        self.request_column = column.into();
        self
    }

    pub fn with_request_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout = seconds;
        self
    }

    pub fn with_max_threads(mut self, threads: usize) -> Self {
        self.max_threads = threads;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Render as a `.env` file that [`Settings::load`] reads back unchanged.
    pub fn to_env_file(&self) -> String {
        let column = self.request_column.replace('\\', "\\\\").replace('"', "\\\"");
        format!(
            "# Linkvet configuration\n\
             \n\
             # Header of the column holding the addresses to validate\n\
             {}=\"{}\"\n\
             \n\
             # Seconds to wait for each address before giving up\n\
             {}={}\n\
             \n\
             # Number of addresses probed at the same time\n\
             {}={}\n",
            REQUEST_COLUMN_KEY,
            column,
            REQUEST_TIMEOUT_KEY,
            self.request_timeout,
            MAX_THREADS_KEY,
            self.max_threads
        )
    }
}

fn parse_positive<T>(key: &str, raw: &str) -> Result<T, SettingsError>
where
    T: std::str::FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let invalid = |reason: String| SettingsError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason,
    };

    let value: T = raw.parse().map_err(|e: T::Err| invalid(e.to_string()))?;
    if value <= T::default() {
        return Err(invalid("must be greater than zero".to_string()));
    }
    Ok(value)
}
