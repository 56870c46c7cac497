//! Tracing setup for the CLI and tests.
//!
//! With a log directory, events go to stderr and to `hearth.log`, rotated
//! daily. `--memory` sessions and tests log to stderr only.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, Layer, util::SubscriberInitExt, EnvFilter};

use crate::error::{HearthError, HearthResult};

const LOG_FILE_NAME: &str = "hearth.log";
const FALLBACK_LEVEL: &str = "info";

/// Keeps the background file writer alive. Dropping it flushes the log.
pub struct LogGuard {
    _writer: WorkerGuard,
}

/// `level` accepts any `EnvFilter` directive (`debug`,
/// `hearth_services=trace,info`); an unparsable one falls back to `info`.
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

/// Install the global subscriber with a stderr layer and a rolling file
/// layer under `log_dir`. `json_output` switches the file layer to JSON
/// lines. Errors if a subscriber is already installed.
pub fn init_logging(level: &str, log_dir: &Path, json_output: bool) -> HearthResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true);
    let file_layer: Box<dyn Layer<_> + Send + Sync> = if json_output {
        file_layer.json().boxed()
    } else {
        file_layer.boxed()
    };

    tracing_subscriber::registry()
        .with(filter(level))
        .with(fmt::layer().compact())
        .with(file_layer)
        .try_init()
        .map_err(|e| HearthError::Config(format!("logging already initialized: {e}")))?;

    tracing::debug!("logging to {}", log_dir.join(LOG_FILE_NAME).display());
    Ok(LogGuard { _writer: guard })
}

/// Stderr-only subscriber. A second call is a no-op.
pub fn init_console_logging(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter(level))
        .with(fmt::layer().compact())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_directive_falls_back() {
        assert_eq!(filter("hearth=loud").to_string(), FALLBACK_LEVEL);
        assert_eq!(filter("hearth_services=debug").to_string(), "hearth_services=debug");
    }

    #[test]
    fn test_console_logging_twice_is_harmless() {
        init_console_logging("debug");
        init_console_logging("warn");
    }
}
