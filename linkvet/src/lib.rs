pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{CheckArgs, CheckRun, apply_overrides, probe_address, run_check, write_env_file};
