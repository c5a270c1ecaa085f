//! Daemon logging
//!
//! Logs go to stdout and, when a directory is available, to a size-rotated
//! `barkeep.log` next to the configuration file. The level is picked from
//! `--log-level`, then `DEBUG_LOGGING`, then `RUST_LOG`.

use std::path::{Path, PathBuf};

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = "barkeep.log";
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;
const DEBUG_DIRECTIVE: &str = "info,barkeep=debug,barkeep_core=debug";
const DEFAULT_DIRECTIVE: &str = "info";

#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    /// Directory for the log file; stdout only when `None`
    pub dir: Option<PathBuf>,
    /// Explicit filter directive, e.g. `debug` or `barkeep_core=trace`
    pub level: Option<String>,
}

impl LogSettings {
    /// Log beside the config file at `config_path`.
    pub fn beside_config(config_path: Option<&Path>, level: Option<String>) -> Self {
        Self {
            dir: config_path.and_then(Path::parent).map(Path::to_path_buf),
            level,
        }
    }
}

/// Install the global subscriber.
///
/// Keep the returned guard alive until exit so buffered file output is
/// flushed. A log file that cannot be opened is reported once the stdout
/// layer is up.
pub fn init(settings: &LogSettings) -> Option<WorkerGuard> {
    let directive = directive(
        settings.level.as_deref(),
        std::env::var_os("DEBUG_LOGGING").is_some(),
        std::env::var("RUST_LOG").ok(),
    );

    let (file, file_error) = match settings.dir.as_deref().map(open_log_file) {
        Some(Ok(opened)) => (Some(opened), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };
    let log_path = file.as_ref().map(|(_, path)| path.clone());

    let (file_layer, guard) = match file {
        Some((appender, _)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(&directive))
        .with(fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!(dir = ?settings.dir, error = %e, "Log file unavailable, logging to stdout only");
    }
    tracing::debug!(%directive, log_file = ?log_path, "Logging initialized");

    guard
}

fn open_log_file(dir: &Path) -> std::io::Result<(BasicRollingFileAppender, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE);
    let appender = BasicRollingFileAppender::new(
        &path,
        RollingConditionBasic::new().max_size(MAX_LOG_BYTES),
        1,
    )?;
    Ok((appender, path))
}

/// Filter directive: explicit level first, then the debug switch, then
/// `RUST_LOG`.
fn directive(level: Option<&str>, debug: bool, env: Option<String>) -> String {
    match level {
        Some(level) if !level.trim().is_empty() => level.trim().to_string(),
        _ if debug => DEBUG_DIRECTIVE.to_string(),
        _ => env
            .filter(|env| !env.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string()),
    }
}
