//! Core logging types: entry levels and the [`Log`] trait.

/// Severity/channel of a single log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Stage header (major section).
    Stage,
    /// Informational line.
    Info,
    /// Debug line (suppressed on console unless verbose).
    Debug,
    /// Warning line, e.g. a skipped link.
    Warn,
    /// Error line, e.g. a failed link.
    Error,
    /// Dry-run action line, rendered with a `[DRY RUN]` prefix.
    DryRun,
    /// Raw machine-readable output (JSON reports) written verbatim to stdout.
    Output,
}

/// Abstraction over logging backends.
///
/// Both [`Logger`](super::logger::Logger) (direct output) and
/// [`BufferedLog`](super::buffered::BufferedLog) (captured output) implement
/// this trait, so the engine can emit lines without knowing where they go.
pub trait Log: std::fmt::Debug {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Emit raw output without decoration.
    fn output(&self, msg: &str);
}
