//! Tracing subscriber setup.
//!
//! Console output goes to stderr. When a log directory is configured a
//! daily rolling file is written through a non-blocking appender. With the
//! `profiling` feature a Chrome trace file is written as well.

use std::path::Path;

use satsky::config::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::error::CliError;

const LOG_FILE_PREFIX: &str = "satsky.log";

/// Keeps the background log writers alive; drop flushes them.
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
    #[cfg(feature = "profiling")]
    _chrome: tracing_chrome::FlushGuard,
}

/// Builds the filter: `RUST_LOG` wins over the configured level.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Installs the global subscriber.
pub fn init(settings: &LoggingSettings, verbose: bool) -> Result<LoggingGuard, CliError> {
    let level = if verbose { "debug" } else { settings.level.as_str() };

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter(level));

    let (file, file_guard) = match &settings.directory {
        Some(dir) => {
            let (writer, guard) = file_writer(dir)?;
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_names(true)
                .with_filter(env_filter(level));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(console).with(file);

    #[cfg(feature = "profiling")]
    {
        let (chrome, chrome_guard) = tracing_chrome::ChromeLayerBuilder::new()
            .include_args(true)
            .build();
        registry.with(chrome).init();
        Ok(LoggingGuard {
            _file: file_guard,
            _chrome: chrome_guard,
        })
    }

    #[cfg(not(feature = "profiling"))]
    {
        registry.init();
        Ok(LoggingGuard { _file: file_guard })
    }
}

fn file_writer(
    dir: &Path,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard), CliError> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}
