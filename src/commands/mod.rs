//! Subcommand orchestration shared by every entry point.
pub mod install;
pub mod refresh;
pub mod status;
pub mod uninstall;
pub mod version;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::GlobalOpts;
use crate::config::SymlinksConfig;
use crate::config::conditions::ConditionContext;
use crate::config::environment::{Environment, ProcessEnvironment};
use crate::config::symlinks::SymlinksFactory;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Log;
use crate::platform::Platform;
use crate::resources::processor::{LinkOutcome, LinkProcessor};
use crate::resources::registry::{Cleanup, SymlinksRegistry};
use crate::resources::symlink::Symlink;

/// The process-level collaborators a command runs against.
#[derive(Debug, Clone, Copy)]
pub struct Host<'a> {
    /// Environment variable lookup.
    pub env: &'a dyn Environment,
    /// Process spawning for the PHP version probe.
    pub executor: &'a dyn Executor,
    /// Output sink.
    pub log: &'a dyn Log,
}

impl<'a> Host<'a> {
    /// Host backed by the real process environment.
    #[must_use]
    pub const fn system(log: &'a dyn Log) -> Self {
        Self {
            env: &ProcessEnvironment,
            executor: &SystemExecutor,
            log,
        }
    }
}

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected platform.
    pub platform: Platform,
    /// Loaded configuration.
    pub config: SymlinksConfig,
    /// PHP version given with `--php-version`, if any.
    pub php_version: Option<String>,
}

impl CommandSetup {
    /// Detect the platform and load the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the project directory cannot be determined or the
    /// manifest cannot be read.
    pub fn init(global: &GlobalOpts, host: &Host<'_>) -> Result<Self> {
        let platform = Platform::detect();
        let project_dir = resolve_project_dir(global)?;

        host.log.debug(&format!("project: {}", project_dir.display()));
        let config = SymlinksConfig::load(&project_dir, host.env)?;
        if let Some(vendor_dir) = config.vendor_dir() {
            host.log
                .debug(&format!("vendor dir: {}", vendor_dir.display()));
        }

        Ok(Self {
            platform,
            config,
            php_version: global.php_version.clone(),
        })
    }

    /// Condition context for this run.  The PHP runtime is only probed when
    /// a `php-version` condition is evaluated.
    #[must_use]
    pub fn conditions<'a>(&'a self, host: &Host<'a>) -> ConditionContext<'a> {
        ConditionContext::probing(
            self.platform.os,
            host.env,
            self.php_version.as_deref(),
            host.executor,
        )
    }

    /// Registry for this project, when a vendor directory is known.
    #[must_use]
    pub fn registry(&self) -> Option<SymlinksRegistry> {
        self.config.vendor_dir().map(SymlinksRegistry::new)
    }
}

/// Resolve the project directory from `--project-dir` or the working directory.
///
/// # Errors
///
/// Returns an error if the working directory cannot be read.
pub fn resolve_project_dir(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(dir) = &global.project_dir {
        return Ok(dir.clone());
    }
    std::env::current_dir().context("reading current directory")
}

/// Tally of one [`run_symlinks`] pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Links created, or that would be created in a dry run.
    pub created: usize,
    /// Links skipped because their destination is occupied.
    pub skipped: usize,
    /// Links whose creation failed.
    pub failed: usize,
}

/// Realise every link, reporting each one.  Per-link failures are logged and
/// processing continues.
///
/// Returns the links that were actually created alongside the tally.
pub fn run_symlinks(
    symlinks: Vec<Symlink>,
    processor: &LinkProcessor,
    log: &dyn Log,
) -> (Vec<Symlink>, RunSummary) {
    let mut summary = RunSummary::default();
    let mut created = Vec::new();

    for symlink in symlinks {
        let line = format!(
            "Symlinking {} to {}",
            symlink.link.display(),
            symlink.target.display()
        );
        match processor.process(&symlink) {
            Ok(LinkOutcome::DryRun) => {
                summary.created += 1;
                log.dry_run(&line);
            }
            Ok(LinkOutcome::Created(_)) => {
                summary.created += 1;
                log.info(&line);
                created.push(symlink);
            }
            Err(e) if e.is_link_directory() => {
                summary.skipped += 1;
                log.warn(&format!("{line} - Skipped ({e})"));
            }
            Err(e) => {
                summary.failed += 1;
                log.error(&format!("{line} - {e}"));
            }
        }
    }

    (created, summary)
}

/// Build links from configuration, realise them, and reconcile the registry.
///
/// The registry is left untouched in dry-run mode.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the registry cannot be
/// written, or any link failed.
pub fn link_all(setup: &CommandSetup, host: &Host<'_>, dry_run: bool) -> Result<RunSummary> {
    let log = host.log;
    let ctx = setup.conditions(host);
    let mut factory = SymlinksFactory::new(&setup.config, &ctx);

    log.stage("Resolving symlinks");
    let symlinks = factory.process(log)?;
    log.debug(&format!(
        "{} configured, {} to create",
        factory.configured_symlinks().len(),
        symlinks.len()
    ));

    log.stage("Creating symlinks");
    let processor = LinkProcessor::new(setup.platform, dry_run);
    let (created, summary) = run_symlinks(symlinks, &processor, log);

    if dry_run {
        log.debug("dry run: registry not updated");
    } else if let Some(registry) = setup.registry() {
        log.stage("Updating registry");
        let cleanup = registry.sync(factory.configured_symlinks(), &created, factory.cleanup())?;
        report_cleanup(&cleanup, log);
        log.debug(&format!("registry: {}", registry.file().display()));
    }

    log.info(&format!(
        "{} created, {} skipped, {} failed",
        summary.created, summary.skipped, summary.failed
    ));
    if summary.failed > 0 {
        anyhow::bail!("{} symlink(s) failed", summary.failed);
    }
    Ok(summary)
}

/// Log what a registry cleanup removed and what it could not remove.
pub fn report_cleanup(cleanup: &Cleanup, log: &dyn Log) {
    for path in &cleanup.removed {
        log.info(&format!("Removed {path}"));
    }
    for (path, reason) in &cleanup.failed {
        log.warn(&format!("Cant remove {path}: {reason}"));
    }
}
