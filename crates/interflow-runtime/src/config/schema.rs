//! Configuration schema definitions.
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "pretty"
//!
//! [logging.filters]
//! interflow_framework = "trace"
//!
//! [session]
//! max_entries = 1000
//! max_age_secs = 900
//! consumption = "reusable"
//!
//! [dispatch]
//! exact_match = true
//!
//! [dispatch.expired_notice]
//! title = "❌  Session expired"
//! description = "This interaction has expired, try again."
//! color = 2895667
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use interflow_framework::{ExpiredNotice, MatchMode, SessionConsumption, SessionSettings};
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterflowConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Session store settings, shared by every provider built from this
    /// configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Dispatch settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the lowercase name used in filter directives.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Newline-delimited JSON. Requires the `json-log` feature.
    #[cfg(feature = "json-log")]
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Requires `logging.file_path`.
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file, used when `output = "file"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,

    /// Per-module levels, e.g. `interflow_framework = "trace"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,

    /// Include thread ids in log lines.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line in log lines.
    #[serde(default)]
    pub file_location: bool,

    #[serde(default)]
    pub span_events: SpanEventConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            filters: HashMap::new(),
            thread_ids: false,
            file_location: false,
            span_events: SpanEventConfig::default(),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Session store configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of live sessions per provider.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Maximum age of a session, in seconds.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,

    /// Whether a session survives being read.
    #[serde(default)]
    pub consumption: SessionConsumption,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            max_age_secs: default_max_age_secs(),
            consumption: SessionConsumption::default(),
        }
    }
}

impl SessionConfig {
    /// Converts into the settings taken by the session store.
    pub fn settings(&self) -> SessionSettings {
        SessionSettings {
            max_entries: self.max_entries,
            max_age: Duration::from_secs(self.max_age_secs),
            consumption: self.consumption,
        }
    }
}

fn default_max_entries() -> usize {
    1000
}

fn default_max_age_secs() -> u64 {
    15 * 60
}

// =============================================================================
// Dispatch
// =============================================================================

/// Dispatch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Only dispatch to routes whose path matches; fallback routes are not
    /// consulted.
    #[serde(default = "default_exact_match")]
    pub exact_match: bool,

    /// The notice sent when a session has expired.
    #[serde(default)]
    pub expired_notice: ExpiredNotice,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            exact_match: default_exact_match(),
            expired_notice: ExpiredNotice::default(),
        }
    }
}

impl DispatchConfig {
    pub fn match_mode(&self) -> MatchMode {
        if self.exact_match {
            MatchMode::Exact
        } else {
            MatchMode::Fallback
        }
    }
}

fn default_exact_match() -> bool {
    true
}
