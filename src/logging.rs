//! SkillSprint logging
//!
//! Structured logging via `tracing`. Log lines go to stderr so command
//! output on stdout stays parseable; `SPRINT_LOG_FILE` redirects them to a
//! file instead.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Environment variable naming a file to append logs to
pub const LOG_FILE_ENV: &str = "SPRINT_LOG_FILE";

/// Logging configuration options
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to output
    pub level: Level,
    pub color: bool,
    pub show_timestamps: bool,
    /// Show target/module name
    pub show_target: bool,
    /// JSON lines for machine parsing
    pub json_format: bool,
    pub enable_spans: bool,
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_mode(ApplicationMode::Cli)
    }
}

/// Application modes with different logging requirements
#[derive(Debug, Clone, Copy)]
pub enum ApplicationMode {
    /// Interactive command line: warnings and up, terse
    Cli,
    /// Maximum detail for tests
    Test,
}

impl LoggingConfig {
    pub fn for_mode(mode: ApplicationMode) -> Self {
        match mode {
            ApplicationMode::Cli => Self {
                level: Level::WARN,
                color: io::stderr().is_terminal(),
                show_timestamps: false,
                show_target: false,
                json_format: false,
                enable_spans: false,
                file_output: None,
            },
            ApplicationMode::Test => Self {
                level: Level::DEBUG,
                color: false,
                show_timestamps: true,
                show_target: true,
                json_format: false,
                enable_spans: true,
                file_output: None,
            },
        }
    }

    /// Build from the global CLI flags
    pub fn from_args(quiet: bool, verbose: u8, json: bool) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => Level::ERROR,
            (false, 0) => Level::WARN,
            (false, 1) => Level::INFO,
            (false, 2) => Level::DEBUG,
            (false, _) => Level::TRACE,
        };

        Self {
            level,
            color: !json && io::stderr().is_terminal(),
            show_timestamps: verbose > 1 || json,
            show_target: verbose > 1,
            json_format: json,
            enable_spans: verbose > 2,
            file_output: std::env::var_os(LOG_FILE_ENV).map(PathBuf::from),
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_logging(config: LoggingConfig) -> io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("skillsprint={}", config.level)));

    let registry = Registry::default().with(env_filter);

    let result = if let Some(log_file) = config.file_output {
        let directory = match log_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = log_file.file_name().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "Invalid log file name")
        })?;
        std::fs::create_dir_all(&directory)?;
        let file_appender = tracing_appender::rolling::never(directory, file_name);

        if config.json_format {
            fmt::layer()
                .json()
                .with_current_span(config.enable_spans)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(file_appender)
                .with_subscriber(registry)
                .try_init()
        } else {
            let layer = fmt::layer()
                .with_target(config.show_target)
                .with_ansi(false)
                .with_writer(file_appender);
            if config.show_timestamps {
                layer
                    .with_timer(fmt::time::ChronoUtc::rfc_3339())
                    .with_subscriber(registry)
                    .try_init()
            } else {
                layer.without_time().with_subscriber(registry).try_init()
            }
        }
    } else if config.json_format {
        fmt::layer()
            .json()
            .with_current_span(config.enable_spans)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(io::stderr)
            .with_subscriber(registry)
            .try_init()
    } else {
        let layer = fmt::layer()
            .with_target(config.show_target)
            .with_ansi(config.color)
            .with_writer(io::stderr);
        if config.show_timestamps {
            layer
                .with_timer(fmt::time::ChronoUtc::rfc_3339())
                .with_subscriber(registry)
                .try_init()
        } else {
            layer.without_time().with_subscriber(registry).try_init()
        }
    };

    result.map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))
}

/// Structured log line for a task mutation issued from the CLI
#[macro_export]
macro_rules! log_task_operation {
    ($operation:expr, $task_id:expr) => {
        tracing::info!(operation = $operation, task_id = %$task_id, "Task operation");
    };
    ($operation:expr, $task_id:expr, $details:expr) => {
        tracing::info!(
            operation = $operation,
            task_id = %$task_id,
            details = $details,
            "Task operation"
        );
    };
}

#[macro_export]
macro_rules! log_project_operation {
    ($operation:expr, $project_id:expr) => {
        tracing::info!(
            operation = $operation,
            project_id = %$project_id,
            "Project operation"
        );
    };
}
