//! `refresh`: create or repair configured links on demand.
use anyhow::Result;

use super::{CommandSetup, Host, RunSummary};
use crate::cli::{GlobalOpts, RefreshOpts};

/// Run the refresh command.
///
/// # Errors
///
/// Returns an error if configuration loading fails, the configuration is
/// invalid, or any link could not be created.
pub fn run(global: &GlobalOpts, opts: &RefreshOpts, host: &Host<'_>) -> Result<RunSummary> {
    let setup = CommandSetup::init(global, host)?;
    super::link_all(&setup, host, opts.dry_run)
}
