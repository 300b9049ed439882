//! Turns the raw `symlinks` map into validated [`Symlink`] records.
use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{Map, Value};

use super::SymlinksConfig;
use super::conditions::{ConditionContext, evaluate};
use super::options::{ABSOLUTE_PATH, FORCE_CREATE, SKIP_MISSING_TARGET, THROW_EXCEPTION};
use super::placeholders::{PathRole, Placeholders, validate_relative};
use crate::error::SymlinksError;
use crate::logging::Log;
use crate::resources::helpers::fs::{
    ensure_parent_dir, is_symlink, normalize_path, resolve_link_target,
};
use crate::resources::symlink::Symlink;

/// Configured link path → canonical target path.
pub type ConfiguredLinks = BTreeMap<String, String>;

/// Builds [`Symlink`] records from a [`SymlinksConfig`].
#[derive(Debug)]
pub struct SymlinksFactory<'a> {
    config: &'a SymlinksConfig,
    ctx: &'a ConditionContext<'a>,
    configured: ConfiguredLinks,
}

impl<'a> SymlinksFactory<'a> {
    /// Create a factory for one run.
    #[must_use]
    pub fn new(config: &'a SymlinksConfig, ctx: &'a ConditionContext<'a>) -> Self {
        Self {
            config,
            ctx,
            configured: ConfiguredLinks::new(),
        }
    }

    /// Every link the last [`process`](Self::process) call accepted,
    /// including links that were already correct and need no work.
    #[must_use]
    pub const fn configured_symlinks(&self) -> &ConfiguredLinks {
        &self.configured
    }

    /// Resolved vendor directory, if known.
    #[must_use]
    pub fn vendor_dir(&self) -> Option<&Path> {
        self.config.vendor_dir()
    }

    /// Whether stale registry entries should be removed.
    #[must_use]
    pub fn cleanup(&self) -> bool {
        self.config.cleanup()
    }

    /// Produce the links that need creating, in configuration order.
    ///
    /// Already-correct links are recorded in
    /// [`configured_symlinks`](Self::configured_symlinks) but not returned.
    ///
    /// # Errors
    ///
    /// - [`SymlinksError::InvalidArgument`] when `symlinks` is not a map, or
    ///   when a definition is invalid and its effective `throw-exception`
    ///   is on.
    /// - [`SymlinksError::LinkDirectory`] when a link's parent directory
    ///   cannot be created, regardless of `throw-exception`.
    pub fn process(&mut self, log: &dyn Log) -> Result<Vec<Symlink>, SymlinksError> {
        self.configured.clear();

        let entries: Vec<(&String, &Value)> = match self.config.symlinks() {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Object(map)) => map.iter().collect(),
            Some(Value::Array(items)) if items.is_empty() => return Ok(Vec::new()),
            Some(_) => {
                return Err(SymlinksError::invalid(
                    "The extra.somework/composer-symlinks.symlinks setting must be an array.",
                ));
            }
        };

        let mut seen: Vec<&Value> = Vec::new();
        let mut symlinks = Vec::new();

        for (target, definition) in entries {
            if seen.contains(&definition) {
                log.debug(&format!("skipping {target}: duplicate link definition"));
                continue;
            }
            seen.push(definition);

            let definitions = match normalize(target, definition) {
                Ok(defs) => defs,
                Err(e) => {
                    self.handle_error(e, definition, log)?;
                    continue;
                }
            };

            for def in definitions {
                match self.build(target, def, log) {
                    Ok(Some(symlink)) => symlinks.push(symlink),
                    Ok(None) => {}
                    Err(e) => self.handle_error(e, def, log)?,
                }
            }
        }

        Ok(symlinks)
    }

    /// Re-raise `error` or downgrade it to a warning, per `throw-exception`.
    fn handle_error(
        &self,
        error: SymlinksError,
        definition: &Value,
        log: &dyn Log,
    ) -> Result<(), SymlinksError> {
        if error.is_link_directory()
            || self
                .config
                .options()
                .effective(definition, THROW_EXCEPTION, true)
        {
            return Err(error);
        }
        log.warn(&error.to_string());
        Ok(())
    }

    fn build(
        &mut self,
        target: &str,
        def: &Value,
        log: &dyn Log,
    ) -> Result<Option<Symlink>, SymlinksError> {
        let conditions = def.get("conditions").unwrap_or(&Value::Null);
        if !evaluate(conditions, self.ctx)? {
            log.debug(&format!("skipping {target}: conditions not met"));
            return Ok(None);
        }

        let link = link_of(def);
        if link.is_empty() {
            return Err(SymlinksError::invalid("No link passed in config"));
        }
        if target.is_empty() {
            return Err(SymlinksError::invalid("No target passed in config"));
        }

        let placeholders = Placeholders::new(
            self.config.project_dir(),
            self.config.vendor_dir(),
            self.ctx.env,
        );
        let target_exp = placeholders.expand(target);
        let link_exp = placeholders.expand(link);
        validate_relative(PathRole::Target, target, &target_exp)?;
        validate_relative(PathRole::Link, link, &link_exp)?;

        let project_dir = self.config.project_dir();
        let target_joined = project_dir.join(&target_exp.value);
        let link_path = normalize_path(&project_dir.join(&link_exp.value));

        let options = self.config.options();
        // Symlinks are resolved before `..` is applied.
        let Ok(target_path) = dunce::canonicalize(&target_joined) else {
            let shown = normalize_path(&target_joined);
            if options.effective(def, SKIP_MISSING_TARGET, false) {
                log.debug(&format!(
                    "skipping {target}: target {} does not exist",
                    shown.display()
                ));
                return Ok(None);
            }
            return Err(SymlinksError::invalid(format!(
                "The target path {} does not exist",
                shown.display()
            )));
        };

        ensure_parent_dir(&link_path).map_err(|e| {
            SymlinksError::LinkDirectory(format!(
                "Cannot create directory for link {}: {e}",
                link_path.display()
            ))
        })?;

        if is_symlink(&link_path)
            && resolve_link_target(&link_path).as_deref() == Some(target_path.as_path())
        {
            self.record(&link_path, &target_path);
            log.info(&format!(
                "Symlinking {} to {} - Already linked",
                link_path.display(),
                target_path.display()
            ));
            return Ok(None);
        }

        let symlink = Symlink::new(target_path, link_path)
            .with_absolute_path(options.effective(def, ABSOLUTE_PATH, false))
            .with_force_create(options.effective(def, FORCE_CREATE, false))
            .with_windows_mode(options.windows_mode(def)?);
        self.record(&symlink.link, &symlink.target);
        Ok(Some(symlink))
    }

    fn record(&mut self, link: &Path, target: &Path) {
        self.configured.insert(
            link.to_string_lossy().into_owned(),
            target.to_string_lossy().into_owned(),
        );
    }
}

/// Expand one map value into its individual definitions.
///
/// A string or object is one definition; a JSON array (or an object keyed
/// `"0"`, `"1"`, … in order) is a list of them.
fn normalize<'v>(target: &str, definition: &'v Value) -> Result<Vec<&'v Value>, SymlinksError> {
    let items: Vec<&Value> = match definition {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) if is_plain_list(map) => map.values().collect(),
        single => vec![single],
    };

    if let Some(bad) = items
        .iter()
        .find(|item| !matches!(item, Value::String(_) | Value::Object(_)))
    {
        return Err(SymlinksError::invalid(format!(
            "Invalid link definition {bad} for target {target}. Expected a string, an object or a list of them."
        )));
    }
    Ok(items)
}

fn is_plain_list(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map
            .keys()
            .enumerate()
            .all(|(idx, key)| key.parse::<usize>().ok() == Some(idx))
}

fn link_of(def: &Value) -> &str {
    match def {
        Value::String(link) => link,
        Value::Object(map) => map.get("link").and_then(Value::as_str).unwrap_or_default(),
        _ => "",
    }
}
