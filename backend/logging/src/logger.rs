//! Structured Logger
//!
//! Wraps `tracing` to provide human-readable stderr output, daily-rolling
//! NDJSON files, and environment-based level control.

use std::path::PathBuf;

use tracing::Subscriber;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// File name prefix for rolled logs: `triage.log.YYYY-MM-DD`.
const LOG_FILE_PREFIX: &str = "triage.log";

/// Where log records go.
#[derive(Debug, Clone, Default)]
pub struct LogOutput {
    /// Write to stderr. Off for full-screen UIs.
    pub console: bool,
    /// Directory for rolling JSON log files.
    pub dir: Option<PathBuf>,
}

impl LogOutput {
    pub fn console() -> Self {
        Self {
            console: true,
            dir: None,
        }
    }

    pub fn with_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.dir = dir;
        self
    }
}

/// Build the filter: `RUST_LOG` wins, otherwise the configured level.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global structured logger.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger(level: &str, output: &LogOutput) {
    let _ = build_subscriber(env_filter(level), output).try_init();
}

fn build_subscriber(
    filter: EnvFilter,
    output: &LogOutput,
) -> impl Subscriber + Send + Sync + use<> {
    let console_layer = output.console.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
    });

    let file_layer = output.dir.as_ref().map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        fmt::layer()
            .json()
            .with_writer(file_appender)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_falls_back() {
        // Only meaningful when RUST_LOG is unset; either way it must not panic.
        let _ = env_filter("not a [valid directive");
    }

    #[test]
    fn file_only_output_writes_json_into_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("logs");
        let output = LogOutput::default().with_dir(Some(dir.clone()));
        assert!(!output.console);

        let subscriber = build_subscriber(EnvFilter::new("info"), &output);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(turn = 1, "logger smoke test");
        });

        let files: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(LOG_FILE_PREFIX));
        let contents = std::fs::read_to_string(&files[0]).unwrap();
        assert!(contents.contains("logger smoke test"));
        assert!(contents.contains("\"turn\":1"));
    }
}
