//! Realises one [`Symlink`] on disk.
use crate::error::SymlinksError;
use crate::platform::Platform;
use crate::resources::helpers::fs::{path_exists, remove_path};
use crate::resources::link::{
    LinkFailure, LinkOps, LinkStrategy, SystemLinkOps, failure_message, plan,
};
use crate::resources::symlink::Symlink;

/// What [`LinkProcessor::process`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The link was created with the given strategy.
    Created(LinkStrategy),
    /// Dry run: nothing was touched.
    DryRun,
}

/// Creates links, replacing existing paths when asked to and falling back
/// through the platform's strategy chain.
#[derive(Debug)]
pub struct LinkProcessor {
    platform: Platform,
    dry_run: bool,
    ops: Box<dyn LinkOps>,
}

impl LinkProcessor {
    /// Create a processor using the real file system.
    #[must_use]
    pub fn new(platform: Platform, dry_run: bool) -> Self {
        Self {
            platform,
            dry_run,
            ops: Box::new(SystemLinkOps::default()),
        }
    }

    /// Replace the link primitives.
    #[must_use]
    pub fn with_ops(mut self, ops: Box<dyn LinkOps>) -> Self {
        self.ops = ops;
        self
    }

    /// Whether this processor only reports.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Create `symlink.link`.
    ///
    /// # Errors
    ///
    /// - [`SymlinksError::LinkDirectory`] when something occupies the link
    ///   path and `force_create` is off (a dangling symlink counts).
    /// - [`SymlinksError::Runtime`] when forced removal fails or every
    ///   strategy in the chain fails.
    pub fn process(&self, symlink: &Symlink) -> Result<LinkOutcome, SymlinksError> {
        let link = &symlink.link;

        if self.dry_run {
            if path_exists(link) && !symlink.force_create {
                return Err(already_exists(symlink));
            }
            return Ok(LinkOutcome::DryRun);
        }

        if symlink.force_create && path_exists(link) {
            remove_path(link).map_err(|e| {
                SymlinksError::Runtime(format!("Cant unlink {}: {e}", link.display()))
            })?;
        }

        if path_exists(link) {
            return Err(already_exists(symlink));
        }

        let strategies = plan(
            &self.platform,
            symlink.windows_mode,
            symlink.target.is_dir(),
        );
        let mut failures = Vec::new();
        for strategy in strategies {
            match self.ops.apply(strategy, symlink) {
                Ok(()) => {
                    tracing::debug!("created {} via {strategy}", link.display());
                    return Ok(LinkOutcome::Created(strategy));
                }
                Err(message) => {
                    tracing::debug!("{strategy} failed for {}: {message}", link.display());
                    failures.push(LinkFailure { strategy, message });
                }
            }
        }

        Err(SymlinksError::Runtime(failure_message(
            &self.platform,
            symlink,
            &failures,
        )))
    }
}

fn already_exists(symlink: &Symlink) -> SymlinksError {
    SymlinksError::LinkDirectory(format!("Link {} already exists", symlink.link.display()))
}
