//! Tracing subscriber setup.
//!
//! `RUST_LOG` overrides the configured level. With `logging.file` set,
//! events also go to that file through a non-blocking writer; the returned
//! guard must be held until exit so buffered lines are flushed.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingSection;

pub fn init(config: &LoggingSection) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| anyhow::anyhow!("Invalid log level {:?}: {}", config.level, e))?;

    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .boxed();

    let (file_layer, guard) = match &config.file {
        Some(file) => {
            let (writer, guard) = file_writer(Path::new(file))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_thread_names(true)
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(guard)
}

fn file_writer(
    path: &Path,
) -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let directory = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Log file path has no file name: {}", path.display()))?;

    std::fs::create_dir_all(directory).map_err(|e| {
        anyhow::anyhow!(
            "Failed to create log directory {}: {}",
            directory.display(),
            e
        )
    })?;
    let appender = tracing_appender::rolling::never(directory, file_name);
    Ok(tracing_appender::non_blocking(appender))
}
