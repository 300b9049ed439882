//! Configuration: the manifest, option coercion, placeholder and condition
//! resolution, and the factory that turns it all into link records.
pub mod conditions;
pub mod environment;
pub mod manifest;
pub mod options;
pub mod placeholders;
pub mod runtime;
pub mod symlinks;
pub mod version;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use environment::Environment;
use manifest::Manifest;
use options::{CLEANUP, GlobalOptions, SYMLINKS};

/// Everything the engine reads from the manifest, resolved once per run.
#[derive(Debug, Clone)]
pub struct SymlinksConfig {
    project_dir: PathBuf,
    vendor_dir: Option<PathBuf>,
    symlinks: Option<Value>,
    options: GlobalOptions,
}

impl SymlinksConfig {
    /// Load the configuration of the project at `project_dir`.
    ///
    /// The project directory is canonicalised first so every derived path is
    /// absolute.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist or the manifest
    /// cannot be read or parsed.
    pub fn load(project_dir: &Path, env: &dyn Environment) -> Result<Self> {
        let project_dir = dunce::canonicalize(project_dir)
            .with_context(|| format!("resolving project directory {}", project_dir.display()))?;

        let manifest = Manifest::load(&project_dir, env).context("loading manifest")?;
        let section = manifest
            .plugin_section()
            .context("reading plugin configuration")?;
        let vendor_dir = manifest.vendor_dir(&project_dir, env);

        Ok(Self::from_section(project_dir, Some(vendor_dir), section))
    }

    /// Build from an already-parsed plugin section.
    #[must_use]
    pub fn from_section(
        project_dir: PathBuf,
        vendor_dir: Option<PathBuf>,
        section: Option<&Map<String, Value>>,
    ) -> Self {
        let (symlinks, options) = section.map_or_else(
            || (None, GlobalOptions::default()),
            |s| (s.get(SYMLINKS).cloned(), GlobalOptions::from_section(s)),
        );
        Self {
            project_dir,
            vendor_dir,
            symlinks,
            options,
        }
    }

    /// Canonical project directory.
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Absolute vendor directory, if known.
    #[must_use]
    pub fn vendor_dir(&self) -> Option<&Path> {
        self.vendor_dir.as_deref()
    }

    /// Raw `symlinks` value.
    #[must_use]
    pub const fn symlinks(&self) -> Option<&Value> {
        self.symlinks.as_ref()
    }

    /// Global option values.
    #[must_use]
    pub const fn options(&self) -> &GlobalOptions {
        &self.options
    }

    /// Whether the `cleanup` option is on.
    #[must_use]
    pub fn cleanup(&self) -> bool {
        self.options.flag(CLEANUP, false)
    }
}
