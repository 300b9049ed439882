//! Console logger backed by [`tracing`].
use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::Log;

/// `tracing` target for stage headers.
pub(super) const STAGE_TARGET: &str = "symlinks::stage";
/// `tracing` target for dry-run lines.
pub(super) const DRY_RUN_TARGET: &str = "symlinks::dry_run";
/// `tracing` target for raw output.
pub(super) const OUTPUT_TARGET: &str = "symlinks::output";

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger that forwards every line to the global `tracing`
/// subscriber installed by [`init_subscriber`](super::subscriber::init_subscriber).
///
/// Keeps a tally of warnings and errors so commands can summarise a run.
#[derive(Debug, Default)]
pub struct Logger {
    warnings: AtomicUsize,
    errors: AtomicUsize,
}

impl Logger {
    /// Create a new logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        self.warnings.fetch_add(1, Ordering::Relaxed);
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Emit raw output (e.g. a JSON document) without decoration.
    pub fn output(&self, msg: &str) {
        tracing::info!(target: OUTPUT_TARGET, "{msg}");
    }

    /// Number of warnings logged so far.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }

    /// Number of errors logged so far.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run, output);
}
