//! Helpers shared by unit tests.
#![cfg(test)]

use std::sync::{
    Arc,
    Mutex,
};

use crate::logger::{
    LogLevel,
    LogSink,
};
use crate::store::lock;

/// Sink recording every message it receives.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemorySink {
    /// Recorded `(level, message)` pairs, prefix included.
    messages: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl MemorySink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn messages(&self) -> Vec<(LogLevel, String)> {
        lock(&self.messages).clone()
    }

    /// Returns true if any message contains `needle`.
    pub(crate) fn contains(&self, needle: &str) -> bool {
        lock(&self.messages).iter().any(|(_, message)| message.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: LogLevel, message: &str) {
        lock(&self.messages).push((level, message.to_string()));
    }
}
