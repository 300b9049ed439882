//! `status`: compare configuration and registry against the disk.
use super::{CommandSetup, Host};
use crate::cli::{GlobalOpts, StatusOpts};
use crate::config::symlinks::SymlinksFactory;
use crate::logging::BufferedLog;
use crate::report::{self, StatusReport};
use crate::resources::registry::{RegistryMap, SymlinksRegistry};

/// Run the status command.
///
/// Returns `false` when the process should exit with a failure: the
/// configuration could not be read, or `--strict` is set and problems were
/// found.
pub fn run(global: &GlobalOpts, opts: &StatusOpts, host: &Host<'_>) -> bool {
    let log = host.log;
    let report = match collect(global, host) {
        Ok(report) => report,
        Err(e) => {
            log.error(&format!("Failed to read symlink configuration: {e:#}"));
            return false;
        }
    };

    let problems = report.has_problems();

    if opts.json {
        match report.to_json() {
            Ok(json) => log.output(&json),
            Err(e) => {
                log.error(&format!("Failed to encode status report: {e}"));
                return false;
            }
        }
        return !(problems && opts.strict);
    }

    for line in report.render() {
        log.output(&line);
    }

    if problems {
        log.error("Problems were found while checking symlinks.");
        !opts.strict
    } else {
        log.output("No issues detected.");
        true
    }
}

fn collect(global: &GlobalOpts, host: &Host<'_>) -> anyhow::Result<StatusReport> {
    let setup = CommandSetup::init(global, host)?;
    let ctx = setup.conditions(host);
    let mut factory = SymlinksFactory::new(&setup.config, &ctx);

    // Definition warnings are demoted to debug output.
    let factory_log = BufferedLog::new();
    factory.process(&factory_log)?;
    for message in factory_log.entries() {
        host.log.debug(&message.message);
    }

    let registry = setup
        .registry()
        .as_ref()
        .map_or_else(RegistryMap::new, SymlinksRegistry::load);

    Ok(report::build(
        &setup.platform,
        factory.configured_symlinks(),
        &registry,
    ))
}
