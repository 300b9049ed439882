//! In-memory logger that captures lines instead of printing them.
use std::sync::Mutex;

use super::logger::{DRY_RUN_TARGET, OUTPUT_TARGET, STAGE_TARGET};
use super::types::{Log, LogLevel};

/// A single captured log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Channel the line was written to.
    pub level: LogLevel,
    /// Message text.
    pub message: String,
}

impl LogEntry {
    /// Replay this entry through the global `tracing` subscriber.
    fn replay(&self) {
        let msg = &self.message;
        match self.level {
            LogLevel::Stage => tracing::info!(target: STAGE_TARGET, "{msg}"),
            LogLevel::Info => tracing::info!("{msg}"),
            LogLevel::Debug => tracing::debug!("{msg}"),
            LogLevel::Warn => tracing::warn!("{msg}"),
            LogLevel::Error => tracing::error!("{msg}"),
            LogLevel::DryRun => tracing::info!(target: DRY_RUN_TARGET, "{msg}"),
            LogLevel::Output => tracing::info!(target: OUTPUT_TARGET, "{msg}"),
        }
    }
}

/// Implement the display methods of [`Log`] by pushing each message into
/// `self.entries` as the corresponding [`LogLevel`].
macro_rules! buffer_log_methods {
    ($($method:ident => $level:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.push(LogLevel::$level, msg);
            }
        )+
    };
}

/// Logger that records every line in order.
///
/// Used wherever output has to be inspected after the fact (integration
/// tests, embedding the engine in another tool); [`flush`](Self::flush)
/// replays the captured lines through `tracing`.
#[derive(Debug, Default)]
pub struct BufferedLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl BufferedLog {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: LogLevel, msg: &str) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(LogEntry {
                level,
                message: msg.to_string(),
            });
        }
    }

    /// Return a snapshot of all captured entries.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Return the messages captured on one channel.
    #[must_use]
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    /// Return `true` if any line on `level` contains `needle`.
    #[must_use]
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.messages(level).iter().any(|m| m.contains(needle))
    }

    /// Replay all captured entries through `tracing` and clear the buffer.
    pub fn flush(&self) {
        let entries = match self.entries.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return,
        };
        for entry in &entries {
            entry.replay();
        }
    }
}

impl Log for BufferedLog {
    buffer_log_methods! {
        stage   => Stage,
        info    => Info,
        debug   => Debug,
        warn    => Warn,
        error   => Error,
        dry_run => DryRun,
        output  => Output,
    }
}
