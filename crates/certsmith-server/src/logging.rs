use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{AppError, Result};

const LOG_FILE_NAME: &str = "certsmith.log";

/// Install the global subscriber: stdout plus an optional daily rolling file.
///
/// The returned guard flushes the file writer and must live as long as the
/// process.
pub fn init_tracing_to_file(log_dir: Option<&Path>, debug: bool) -> Result<Option<WorkerGuard>> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let console_layer = fmt::layer().with_writer(std::io::stdout);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_ansi(false).with_writer(file_writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::Internal(format!("failed to install tracing subscriber: {}", e)))?;

    Ok(guard)
}
