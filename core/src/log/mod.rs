//! Logger initialisation backed by `log4rs`.
//!
//! Library crates only use the `log` macros. Binaries call [`init_logger`] once at startup.

mod appender;
pub mod consts;
mod logger;

use appender::AppenderSpec;
use consts::{DEFAULT_LOGGER_ENV, ERR_LOG_FILE_NAME, LOG_FILE_NAME};
use log::{LevelFilter, warn};
use log4rs::config::{Config, Root};
use thiserror::Error;

const CONSOLE_APPENDER: &str = "stdout";
const LOG_FILE_APPENDER: &str = "log_file";
const ERR_LOG_FILE_APPENDER: &str = "err_log_file";

#[derive(Clone, Debug, Error)]
pub enum LogError {
    #[error("logger spec parsing error: {0}")]
    ParseLoggerSpec(String),

    #[error("log directory {0} is not valid unicode")]
    InvalidLogDir(String),

    #[error("failed building appender {0}: {1}")]
    Appender(&'static str, String),

    #[error("invalid logger configuration: {0}")]
    Config(String),

    #[error("a logger is already installed: {0}")]
    AlreadyInitialized(String),
}

pub type LogResult<T> = std::result::Result<T, LogError>;

/// Installs the global logger.
///
/// `filters` follows the `RUST_LOG` syntax and is applied on top of the environment variable.
/// When `log_dir` is provided, all records go to a rolling log file and warnings or worse also
/// go to a separate error file.
pub fn init_logger(log_dir: Option<&str>, filters: &str) -> LogResult<()> {
    let (config, rejected) = build_config(log_dir, filters)?;
    log4rs::init_config(config).map_err(|err| LogError::AlreadyInitialized(err.to_string()))?;

    for rejected in rejected {
        warn!("Ignoring invalid logging spec: {rejected}");
    }
    Ok(())
}

/// Builds the `log4rs` configuration without installing it. Also returns the filter directives
/// which could not be parsed.
fn build_config(log_dir: Option<&str>, filters: &str) -> LogResult<(Config, Vec<LogError>)> {
    let console = AppenderSpec::console(CONSOLE_APPENDER, None);
    let files = match log_dir {
        Some(dir) => vec![
            AppenderSpec::roller(LOG_FILE_APPENDER, None, dir, LOG_FILE_NAME)?,
            AppenderSpec::roller(ERR_LOG_FILE_APPENDER, Some(LevelFilter::Warn), dir, ERR_LOG_FILE_NAME)?,
        ],
        None => vec![],
    };
    let specs: Vec<_> = std::iter::once(console).chain(files).collect();
    let names: Vec<&'static str> = specs.iter().map(|s| s.name).collect();

    let loggers = logger::Builder::new()
        .root_level(LevelFilter::Info)
        .appenders(names.iter().copied())
        .parse_env(DEFAULT_LOGGER_ENV)
        .parse_expression(filters)
        .build();

    let config = Config::builder()
        .appenders(specs.into_iter().map(AppenderSpec::appender))
        .loggers(loggers.items())
        .build(Root::builder().appenders(names.iter().map(|x| x.to_string())).build(loggers.root_level()))
        .map_err(|err| LogError::Config(err.to_string()))?;

    Ok((config, loggers.rejected().to_vec()))
}
