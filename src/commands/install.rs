//! `install` and `update`: the lifecycle hooks run after dependency changes.
use anyhow::Result;

use super::{CommandSetup, Host, RunSummary};
use crate::cli::GlobalOpts;

/// Environment variable enabling dry-run mode for the lifecycle hooks.
pub const DRY_RUN_ENV: &str = "SYMLINKS_DRY_RUN";

/// Which lifecycle event triggered the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// Dependencies were installed.
    Install,
    /// Dependencies were updated.
    Update,
}

impl Hook {
    const fn name(self) -> &'static str {
        match self {
            Self::Install => "post-install",
            Self::Update => "post-update",
        }
    }
}

/// Whether `SYMLINKS_DRY_RUN` requests a dry run (`1` or `true`).
#[must_use]
pub fn dry_run_requested(host: &Host<'_>) -> bool {
    host.env
        .var(DRY_RUN_ENV)
        .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
}

/// Run a lifecycle hook.
///
/// # Errors
///
/// Returns an error if configuration loading fails, the configuration is
/// invalid, or any link could not be created.
pub fn run(global: &GlobalOpts, hook: Hook, host: &Host<'_>) -> Result<RunSummary> {
    host.log.debug(&format!(
        "composer-symlinks {} ({})",
        super::version::version(),
        hook.name()
    ));

    let dry_run = dry_run_requested(host);
    if dry_run {
        host.log.debug(&format!("{DRY_RUN_ENV} is set"));
    }

    let setup = CommandSetup::init(global, host)?;
    super::link_all(&setup, host, dry_run)
}
