//! Tracing subscriber setup.
//!
//! Console output always goes to stderr: with the stdio transport, stdout
//! carries protocol messages only.

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{Error, Result};
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log file name prefix inside `logging.dir`
const LOG_FILE_PREFIX: &str = "mcp-k8s.log";

/// Build the level filter. `RUST_LOG` wins over the configured level.
pub fn env_filter(level: &str) -> EnvFilter {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    resolve_filter(from_env.as_deref(), level)
}

/// First valid directive wins: environment, configured level, then `info`
fn resolve_filter(from_env: Option<&str>, level: &str) -> EnvFilter {
    from_env
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let console = match config.format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(false)
            .boxed(),
    };

    let (file, guard) = match &config.dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let (writer, guard) = non_blocking(rolling::daily(dir, LOG_FILE_PREFIX));
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_ids(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| Error::Internal(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!("Logging initialized (level {}, format {:?})", config.level, config.format);
    if let Some(dir) = &config.dir {
        tracing::info!("Writing log files to {}", dir.display());
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_is_used() {
        assert_eq!(resolve_filter(None, "debug").to_string(), "debug");
    }

    #[test]
    fn test_invalid_level_falls_back_to_info() {
        assert_eq!(resolve_filter(None, "mcp_k8s=loud").to_string(), "info");
    }

    #[test]
    fn test_environment_wins_over_configured_level() {
        assert_eq!(resolve_filter(Some("warn"), "debug").to_string(), "warn");
        assert_eq!(resolve_filter(Some("mcp_k8s=loud"), "debug").to_string(), "debug");
    }
}
