//! Process-wide logger handle.
//!
//! Library code never logs through a module-level mutable binding; it takes
//! the current handle with [`current`] at each call site. The handle starts
//! as a `warn`-level logger writing to `tracing` and can be replaced with
//! [`set_logger`] (the `log` section of a configuration does this).

use std::fmt;
use std::sync::{
    Arc,
    LazyLock,
    PoisonError,
    RwLock,
};

use serde::{
    Deserialize,
    Serialize,
};

/// Default prefix prepended to every message.
pub const DEFAULT_PREFIX: &str = "[i18n]: ";

/// Severity channel. A logger emits every channel up to its configured level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Debug,
}

/// Destination for formatted log messages.
pub trait LogSink: Send + Sync + fmt::Debug {
    fn log(&self, level: LogLevel, message: &str);
}

/// Sink forwarding to `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => tracing::error!(target: "routed_i18n", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "routed_i18n", "{message}"),
            LogLevel::Debug => tracing::debug!(target: "routed_i18n", "{message}"),
        }
    }
}

/// Logger settings accepted by the configuration.
#[derive(Debug, Clone)]
pub struct LogSettings {
    pub level: LogLevel,
    pub prefix: String,
    /// Custom sink. `None` keeps [`TracingSink`].
    pub sink: Option<Arc<dyn LogSink>>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: LogLevel::default(), prefix: DEFAULT_PREFIX.to_string(), sink: None }
    }
}

/// A leveled, prefixed logger.
#[derive(Debug, Clone)]
pub struct Logger {
    /// Most verbose level emitted.
    level: LogLevel,
    /// Prepended to every message.
    prefix: String,
    /// Destination of emitted messages.
    sink: Arc<dyn LogSink>,
}

impl Logger {
    #[must_use]
    pub fn new(settings: &LogSettings) -> Self {
        Self {
            level: settings.level,
            prefix: settings.prefix.clone(),
            sink: settings.sink.clone().unwrap_or_else(|| Arc::new(TracingSink)),
        }
    }

    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Error, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Warn, message.as_ref());
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Debug, message.as_ref());
    }

    /// Prefixes and forwards `message` if `level` is enabled.
    fn emit(&self, level: LogLevel, message: &str) {
        if level <= self.level {
            self.sink.log(level, &format!("{}{message}", self.prefix));
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(&LogSettings::default())
    }
}

/// The process-wide handle.
static LOGGER: LazyLock<RwLock<Arc<Logger>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Logger::default())));

/// Returns the current logger handle.
#[must_use]
pub fn current() -> Arc<Logger> {
    Arc::clone(&LOGGER.read().unwrap_or_else(PoisonError::into_inner))
}

/// Replaces the process-wide logger.
pub fn set_logger(logger: Logger) {
    *LOGGER.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(logger);
}
