//! Command: print version information.
use crate::logging::Log;

/// Version string embedded at build time, falling back to the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("SYMLINKS_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the version.
pub fn run(log: &dyn Log) {
    log.output(&format!("composer-symlinks {}", version()));
}
