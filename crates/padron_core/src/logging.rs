//! Structured logging setup with console and file output.
//!
//! Provides:
//! - Daily rotating log files
//! - Build-type conditional log levels
//! - Environment variable override via PADRON_LOG or RUST_LOG
//!
//! stdout belongs to the menu. In an interactive terminal logs go to the file
//! only, since the menu already prints every failure the user needs to see.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Console filter used when the file logger is unavailable in a terminal.
const QUIET_CONSOLE_FILTER: &str = "error,padron=off,padron_core=off,tokio_postgres=off";

/// Logging configuration.
pub struct LogConfig {
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Whether running in an interactive terminal
    pub is_pty: bool,
}

impl LogConfig {
    /// Create a new logging configuration.
    pub fn new(log_dir: PathBuf) -> Self {
        Self { log_dir, is_pty: atty::is(atty::Stream::Stdin) }
    }
}

/// Guard that must be held for the lifetime of the application.
///
/// Dropping this guard flushes pending log entries.
pub struct LoggingGuard {
    _worker_guard: Option<WorkerGuard>,
}

/// Initialize logging with the given configuration.
///
/// Interactive sessions log to the file only; piped sessions also mirror
/// warnings to stderr. If the file cannot be opened, falls back to stderr with
/// a filter chosen by [`console_default_filter`].
pub fn init_logging(config: LogConfig) -> LoggingGuard {
    match init_file_logging(&config) {
        Ok(guard) => LoggingGuard { _worker_guard: Some(guard) },
        Err(e) => {
            if !config.is_pty {
                eprintln!("Warning: Failed to initialize file logging: {}. Using console only.", e);
            }
            init_stderr_logging(console_default_filter(config.is_pty))
        }
    }
}

fn init_stderr_logging(default_filter: &str) -> LoggingGuard {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(build_env_filter(default_filter))
        .with_ansi(true)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    LoggingGuard { _worker_guard: None }
}

fn init_file_logging(config: &LogConfig) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&config.log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("padron")
        .filename_suffix("log")
        .build(&config.log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = build_env_filter(default_log_filter());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false);

    if config.is_pty {
        subscriber.with_writer(non_blocking).init();
    } else {
        let stderr = std::io::stderr.with_max_level(tracing::Level::WARN);
        subscriber.with_writer(stderr.and(non_blocking)).init();
    }

    Ok(guard)
}

/// Build the environment filter, falling back to `default_filter`.
fn build_env_filter(default_filter: &str) -> EnvFilter {
    // Priority: PADRON_LOG > RUST_LOG > default
    EnvFilter::try_from_env("PADRON_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Get the default log filter based on build type.
pub fn default_log_filter() -> &'static str {
    #[cfg(debug_assertions)]
    {
        "warn,padron=debug,padron_core=debug,tokio_postgres=warn"
    }
    #[cfg(not(debug_assertions))]
    {
        "warn,padron=info,padron_core=warn,tokio_postgres=error"
    }
}

/// Default filter for console-only logging.
///
/// In a terminal the console is shared with the menu, so crate logs are off.
pub fn console_default_filter(is_pty: bool) -> &'static str {
    if is_pty {
        QUIET_CONSOLE_FILTER
    } else {
        default_log_filter()
    }
}

/// Get the default log directory.
pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("padron")
        .join("logs")
}
