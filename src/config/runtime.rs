//! PHP runtime version detection for `php-version` conditions.
use crate::config::environment::Environment;
use crate::config::version::Version;
use crate::exec::Executor;

/// Environment variable overriding the detected PHP version.
pub const PHP_VERSION_ENV: &str = "SYMLINKS_PHP_VERSION";

/// Resolve the PHP version conditions are evaluated against.
///
/// Order: the explicit value (`--php-version`), then `SYMLINKS_PHP_VERSION`,
/// then `php -r 'echo PHP_VERSION;'` when `php` is on `PATH`.  Returns `None`
/// when nothing yields a parseable version.
#[must_use]
pub fn detect_php_version(
    explicit: Option<&str>,
    env: &dyn Environment,
    executor: &dyn Executor,
) -> Option<Version> {
    if let Some(v) = explicit.and_then(|s| s.parse().ok()) {
        return Some(v);
    }

    if let Some(v) = env
        .var(PHP_VERSION_ENV)
        .and_then(|s| s.parse().ok())
    {
        return Some(v);
    }

    if !executor.which("php") {
        tracing::debug!("php not found on PATH, php-version conditions will not match");
        return None;
    }

    match executor.run("php", &["-r", "echo PHP_VERSION;"]) {
        Ok(result) => result.stdout.trim().parse().ok(),
        Err(e) => {
            tracing::debug!("php version probe failed: {e:#}");
            None
        }
    }
}
