//! Reading `composer.json`: the plugin section and the vendor directory.
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::environment::Environment;
use crate::error::ManifestError;
use crate::resources::helpers::fs::normalize_path;

/// Namespace key of the plugin inside `extra`.
pub const PACKAGE_NAME: &str = "somework/composer-symlinks";
/// Environment variable naming an alternative manifest file.
pub const MANIFEST_ENV: &str = "COMPOSER";
/// Environment variable overriding `config.vendor-dir`.
pub const VENDOR_DIR_ENV: &str = "COMPOSER_VENDOR_DIR";
/// Manifest file name used when `COMPOSER` is unset.
pub const DEFAULT_MANIFEST: &str = "composer.json";
/// Vendor directory used when nothing configures one.
pub const DEFAULT_VENDOR_DIR: &str = "vendor";

/// A parsed project manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    root: Value,
}

impl Manifest {
    /// Load the manifest for `project_dir`.
    ///
    /// The file is `composer.json` unless `COMPOSER` names another one
    /// (relative names resolve against the project directory).
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Read`] if the file cannot be read and
    /// [`ManifestError::Parse`] if it is not valid JSON.
    pub fn load(project_dir: &Path, env: &dyn Environment) -> Result<Self, ManifestError> {
        let name = env
            .var(MANIFEST_ENV)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MANIFEST.to_string());
        let path = project_dir.join(name);

        let text = fs::read_to_string(&path).map_err(|source| ManifestError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parse manifest text that was read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] if `text` is not valid JSON.
    pub fn parse(path: PathBuf, text: &str) -> Result<Self, ManifestError> {
        let root = serde_json::from_str(text).map_err(|source| ManifestError::Parse {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, root })
    }

    /// Path of the manifest file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `extra."somework/composer-symlinks"` object, if present.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::NotAnObject`] when `extra` or the plugin
    /// section exists with a non-object type.
    pub fn plugin_section(&self) -> Result<Option<&Map<String, Value>>, ManifestError> {
        let Some(extra) = self.object_at(&self.root, "extra", "extra")? else {
            return Ok(None);
        };
        let key = format!("extra.{PACKAGE_NAME}");
        match extra.get(PACKAGE_NAME) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(section)) => Ok(Some(section)),
            Some(Value::Array(items)) if items.is_empty() => Ok(None),
            Some(_) => Err(self.not_an_object(key)),
        }
    }

    /// Absolute vendor directory.
    ///
    /// `COMPOSER_VENDOR_DIR` wins over `config.vendor-dir`, which wins over
    /// `vendor`.  Relative values resolve against `project_dir`.
    #[must_use]
    pub fn vendor_dir(&self, project_dir: &Path, env: &dyn Environment) -> PathBuf {
        let configured = env
            .var(VENDOR_DIR_ENV)
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                self.root
                    .get("config")
                    .and_then(|c| c.get("vendor-dir"))
                    .and_then(Value::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_VENDOR_DIR.to_string());

        normalize_path(&project_dir.join(configured))
    }

    fn object_at<'a>(
        &self,
        parent: &'a Value,
        key: &str,
        label: &str,
    ) -> Result<Option<&'a Map<String, Value>>, ManifestError> {
        match parent.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(Value::Array(items)) if items.is_empty() => Ok(None),
            Some(_) => Err(self.not_an_object(label.to_string())),
        }
    }

    fn not_an_object(&self, key: String) -> ManifestError {
        ManifestError::NotAnObject {
            path: self.path.clone(),
            key,
        }
    }
}
