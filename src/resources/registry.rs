//! Persisted record of the links this tool created, kept in the vendor
//! directory as `composer-symlinks-state.json`.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::SymlinksError;
use crate::resources::helpers::fs::{path_exists, remove_path, resolve_link_target};
use crate::resources::symlink::Symlink;

/// File name of the registry inside the vendor directory.
pub const REGISTRY_FILENAME: &str = "composer-symlinks-state.json";

/// Absolute link path → absolute resolved target path.
pub type RegistryMap = BTreeMap<String, String>;

/// Paths removed (or that could not be removed) during a cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cleanup {
    /// Link paths removed from disk and from the registry.
    pub removed: Vec<String>,
    /// Link paths that could not be removed, with the OS error text.  These
    /// stay registered so a later run can retry.
    pub failed: Vec<(String, String)>,
}

/// Load/sync/teardown of the registry file.
#[derive(Debug, Clone)]
pub struct SymlinksRegistry {
    file: PathBuf,
}

impl SymlinksRegistry {
    /// Registry stored in `vendor_dir`.
    #[must_use]
    pub fn new(vendor_dir: &Path) -> Self {
        Self {
            file: vendor_dir.join(REGISTRY_FILENAME),
        }
    }

    /// Path of the registry file.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Read the registry.
    ///
    /// A missing, unreadable or malformed file yields an empty map; entries
    /// whose value is not a string are dropped.
    #[must_use]
    pub fn load(&self) -> RegistryMap {
        let Ok(text) = fs::read_to_string(&self.file) else {
            return RegistryMap::new();
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => map
                .into_iter()
                .filter_map(|(link, target)| match target {
                    Value::String(target) => Some((link, target)),
                    _ => None,
                })
                .collect(),
            Ok(_) | Err(_) => {
                tracing::debug!("ignoring malformed registry {}", self.file.display());
                RegistryMap::new()
            }
        }
    }

    /// Reconcile the registry with this run.
    ///
    /// 1. Drop entries whose path no longer exists.
    /// 2. Record each processed link with what it actually points at.
    /// 3. Record configured links: overwrite known keys with the configured
    ///    target, add unknown keys whose path exists.
    /// 4. When `cleanup` is set, remove every path not in `configured` from
    ///    disk and from the registry.
    /// 5. Persist, deleting the file if nothing is left.
    ///
    /// # Errors
    ///
    /// Returns [`SymlinksError::Runtime`] if the registry cannot be written
    /// or deleted.
    pub fn sync(
        &self,
        configured: &BTreeMap<String, String>,
        processed: &[Symlink],
        cleanup: bool,
    ) -> Result<Cleanup, SymlinksError> {
        let mut registry = self.load();
        registry.retain(|link, _| path_exists(Path::new(link)));

        for symlink in processed {
            if !path_exists(&symlink.link) {
                continue;
            }
            let actual = resolve_link_target(&symlink.link).unwrap_or_else(|| symlink.target.clone());
            registry.insert(path_key(&symlink.link), path_key(&actual));
        }

        for (link, target) in configured {
            if let Some(existing) = registry.get_mut(link) {
                existing.clone_from(target);
            } else if let Some(actual) = resolve_link_target(Path::new(link)) {
                registry.insert(link.clone(), path_key(&actual));
            }
        }

        let mut report = Cleanup::default();
        if cleanup {
            let stale: Vec<String> = registry
                .keys()
                .filter(|link| !configured.contains_key(*link))
                .cloned()
                .collect();
            for link in stale {
                match remove_path(Path::new(&link)) {
                    Ok(()) => {
                        registry.remove(&link);
                        report.removed.push(link);
                    }
                    Err(e) => report.failed.push((link, e.to_string())),
                }
            }
        }

        self.save(&registry)?;
        Ok(report)
    }

    /// Remove every registered path from disk, then delete the registry.
    ///
    /// # Errors
    ///
    /// Returns [`SymlinksError::Runtime`] if the registry file cannot be
    /// deleted.
    pub fn remove_all(&self) -> Result<Cleanup, SymlinksError> {
        let mut report = Cleanup::default();
        for link in self.load().into_keys() {
            match remove_path(Path::new(&link)) {
                Ok(()) => report.removed.push(link),
                Err(e) => report.failed.push((link, e.to_string())),
            }
        }
        self.clear()?;
        Ok(report)
    }

    /// Delete the registry file if present.
    ///
    /// # Errors
    ///
    /// Returns [`SymlinksError::Runtime`] if the file exists but cannot be
    /// deleted.
    pub fn clear(&self) -> Result<(), SymlinksError> {
        match fs::remove_file(&self.file) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SymlinksError::Runtime(format!(
                "Cant remove registry {}: {e}",
                self.file.display()
            ))),
        }
    }

    /// Write `registry` (pretty-printed, four-space indent) or delete the
    /// file when empty.  Writes go through a sibling temp file.
    fn save(&self, registry: &RegistryMap) -> Result<(), SymlinksError> {
        if registry.is_empty() {
            return self.clear();
        }

        let write_error = |e: &dyn std::fmt::Display| {
            SymlinksError::Runtime(format!(
                "Cant write registry {}: {e}",
                self.file.display()
            ))
        };

        if let Some(dir) = self.file.parent() {
            fs::create_dir_all(dir).map_err(|e| write_error(&e))?;
        }

        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        registry.serialize(&mut ser).map_err(|e| write_error(&e))?;

        let tmp = self.file.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, &buf) {
            let _ = fs::remove_file(&tmp);
            return Err(write_error(&e));
        }
        fs::rename(&tmp, &self.file).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            write_error(&e)
        })
    }
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
