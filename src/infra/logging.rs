//! # Logging Module / 日志模块
//!
//! Builds the process-wide `tracing` subscriber from a global verbosity and
//! per-channel overrides. A channel is a target prefix such as `tagtest` or
//! `tagtest::core::discovery`.
//!
//! 根据全局详细程度和按通道的覆盖设置构建进程级 `tracing` 订阅者。

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Global verbosity selected with `-q`, `-v` or `-d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::ERROR,
            Verbosity::Normal => LevelFilter::WARN,
            Verbosity::Verbose => LevelFilter::INFO,
            Verbosity::Debug => LevelFilter::DEBUG,
        }
    }

    /// INFO or more detailed.
    pub fn is_verbose(self) -> bool {
        self.level_filter() >= LevelFilter::INFO
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogDirectiveError {
    #[error("invalid log directive '{0}': expected <name>:<level>")]
    Malformed(String),
    #[error("unknown log level '{0}'")]
    UnknownLevel(String),
}

/// Parses a level name, ignoring case. `CRITICAL` maps to ERROR and
/// `WARNING` to WARN.
pub fn parse_level(name: &str) -> Result<LevelFilter, LogDirectiveError> {
    match name.to_ascii_uppercase().as_str() {
        "TRACE" => Ok(LevelFilter::TRACE),
        "DEBUG" => Ok(LevelFilter::DEBUG),
        "INFO" => Ok(LevelFilter::INFO),
        "WARN" | "WARNING" => Ok(LevelFilter::WARN),
        "ERROR" | "CRITICAL" => Ok(LevelFilter::ERROR),
        "OFF" => Ok(LevelFilter::OFF),
        _ => Err(LogDirectiveError::UnknownLevel(name.to_string())),
    }
}

/// One `-L name:LEVEL` override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDirective {
    pub channel: String,
    pub level: LevelFilter,
}

impl FromStr for LogDirective {
    type Err = LogDirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (channel, level) = s
            .rsplit_once(':')
            .filter(|(channel, level)| !channel.is_empty() && !level.is_empty())
            .ok_or_else(|| LogDirectiveError::Malformed(s.to_string()))?;
        Ok(LogDirective {
            channel: channel.to_string(),
            level: parse_level(level)?,
        })
    }
}

impl fmt::Display for LogDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.channel, self.level)
    }
}

/// Global level plus channel overrides. A later override of the same
/// channel replaces an earlier one.
///
/// 全局级别加上按通道的覆盖设置。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    pub verbosity: Verbosity,
    pub channels: BTreeMap<String, LevelFilter>,
}

impl LogConfig {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            channels: BTreeMap::new(),
        }
    }

    pub fn directive(&mut self, directive: LogDirective) -> &mut Self {
        self.channels.insert(directive.channel, directive.level);
        self
    }

    /// The filter string, e.g. `warn,tagtest::core::discovery=debug`.
    pub fn filter_directives(&self) -> String {
        let mut directives = vec![self.verbosity.level_filter().to_string().to_lowercase()];
        directives.extend(
            self.channels
                .iter()
                .map(|(channel, level)| format!("{channel}={}", level.to_string().to_lowercase())),
        );
        directives.join(",")
    }

    pub fn env_filter(&self) -> anyhow::Result<EnvFilter> {
        let directives = self.filter_directives();
        EnvFilter::builder()
            .parse(&directives)
            .map_err(|e| anyhow::anyhow!("invalid log filter '{directives}': {e}"))
    }

    /// Installs the global subscriber writing to stderr. Only the first call
    /// in a process takes effect.
    pub fn init(&self) -> anyhow::Result<()> {
        let filter = self.env_filter()?;
        let installed = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .without_time()
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .try_init();
        if installed.is_err() {
            debug!("a global tracing subscriber is already installed");
        }
        Ok(())
    }
}
