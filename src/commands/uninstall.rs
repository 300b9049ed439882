//! `uninstall`: remove every registered link and the registry itself.
use anyhow::Result;

use super::{CommandSetup, Host};
use crate::cli::GlobalOpts;
use crate::resources::registry::Cleanup;

/// Run the uninstall command.
///
/// # Errors
///
/// Returns an error if configuration loading fails, the registry cannot be
/// deleted, or any registered path could not be removed.
pub fn run(global: &GlobalOpts, host: &Host<'_>) -> Result<Cleanup> {
    let setup = CommandSetup::init(global, host)?;
    let Some(registry) = setup.registry() else {
        host.log.info("no vendor directory, nothing to remove");
        return Ok(Cleanup::default());
    };

    host.log.stage("Removing symlinks");
    let cleanup = registry.remove_all()?;
    super::report_cleanup(&cleanup, host.log);

    if cleanup.removed.is_empty() && cleanup.failed.is_empty() {
        host.log.info("no registered symlinks");
    }
    if !cleanup.failed.is_empty() {
        anyhow::bail!("{} path(s) could not be removed", cleanup.failed.len());
    }
    Ok(cleanup)
}
