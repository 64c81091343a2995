//! Logging setup on the `tracing` stack.
//!
//! [`init_from_config`] is the supported entry point: console output is
//! always installed, and a daily-rotated file layer is added only when
//! the configuration names a log directory. Installation is first-wins;
//! in a process that already set a global subscriber these calls are
//! no-ops.

use std::path::Path;

use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::error::NxResult;

/// Keeps the background file writer alive. Drop to flush and close.
pub struct LogGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Initialize logging as described by the `[logging]` config section.
///
/// An empty `directory` means console-only and no guard; otherwise the
/// returned guard must be kept alive for as long as file logging should
/// continue.
pub fn init_from_config(config: &LoggingConfig) -> NxResult<Option<LogGuard>> {
    if config.directory.is_empty() {
        init_console_logging(&config.level);
        return Ok(None);
    }
    init_logging(&config.level, Path::new(&config.directory), config.json_output).map(Some)
}

/// Initialize console plus daily-rotated file logging.
pub fn init_logging(level: &str, log_dir: &Path, json_output: bool) -> NxResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let (writer, guard) =
        tracing_appender::non_blocking(rolling::daily(log_dir, "nuxeo-client.log"));

    let file_layer = if json_output {
        fmt::layer()
            .with_writer(writer)
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt::layer().with_target(true).compact())
        .with(file_layer)
        .try_init();

    tracing::info!("logging to {} at level={level}", log_dir.display());

    Ok(LogGuard { _guard: guard })
}

/// Console-only logging for tests and embedders without a log directory.
pub fn init_console_logging(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt::layer().with_target(true).compact())
        .try_init();
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}
