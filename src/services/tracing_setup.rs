//! Tracing subscriber setup
//!
//! Shared by the binary and the tests that want file logging.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Default log file: `treepick-<pid>.log` in the system temp dir
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(format!("treepick-{}.log", std::process::id()))
}

/// Initialize the global tracing subscriber with file logging.
///
/// Filtering follows `RUST_LOG`, with DEBUG as the default level.
/// Returns false if the log file could not be created or a subscriber was
/// already installed.
pub fn init_global(log_file_path: &Path) -> bool {
    let Ok(log_file) = File::create(log_file_path) else {
        return false;
    };
    build_subscriber(log_file).try_init().is_ok()
}

/// Build a subscriber writing to `log_file`.
pub fn build_subscriber(log_file: File) -> impl tracing::Subscriber + Send + Sync {
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::DEBUG.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer().with_ansi(false).with_writer(Arc::new(log_file));

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}
