//! Global and per-entry option lookup with loose boolean coercion.
use serde_json::{Map, Value};

use crate::error::SymlinksError;
use crate::resources::symlink::WindowsMode;

/// Key holding the link map.
pub const SYMLINKS: &str = "symlinks";
/// Drop entries whose target does not exist instead of failing.
pub const SKIP_MISSING_TARGET: &str = "skip-missing-target";
/// Store absolute link targets instead of relative ones.
pub const ABSOLUTE_PATH: &str = "absolute-path";
/// Re-raise per-entry errors instead of logging them.
pub const THROW_EXCEPTION: &str = "throw-exception";
/// Replace whatever occupies the link path.
pub const FORCE_CREATE: &str = "force-create";
/// Fallback strategy selector on Windows.
pub const WINDOWS_MODE: &str = "windows-mode";
/// Remove registered links that are no longer configured.
pub const CLEANUP: &str = "cleanup";

/// Coerce a JSON value to a boolean.
///
/// `false`, `0`, `""`, `"0"`, `null`, `[]` and `{}` are false; everything
/// else is true.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Option values read from the plugin section, shared by every entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalOptions {
    values: Map<String, Value>,
}

impl GlobalOptions {
    /// Capture the option keys of a plugin section.
    #[must_use]
    pub fn from_section(section: &Map<String, Value>) -> Self {
        let values = section
            .iter()
            .filter(|(key, _)| key.as_str() != SYMLINKS)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self { values }
    }

    /// Raw global value of `name`; `null` counts as unset.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    /// Global boolean option, or `default` when unset.
    #[must_use]
    pub fn flag(&self, name: &str, default: bool) -> bool {
        self.get(name).map_or(default, is_truthy)
    }

    /// Effective boolean option for one definition: the definition's own
    /// value wins, then the global value, then `default`.
    #[must_use]
    pub fn effective(&self, definition: &Value, name: &str, default: bool) -> bool {
        definition_value(definition, name).map_or_else(|| self.flag(name, default), is_truthy)
    }

    /// Effective `windows-mode` for one definition.
    ///
    /// # Errors
    ///
    /// Returns [`SymlinksError::InvalidArgument`] when the value is not a
    /// scalar or names an unknown mode.
    pub fn windows_mode(&self, definition: &Value) -> Result<WindowsMode, SymlinksError> {
        match definition_value(definition, WINDOWS_MODE).or_else(|| self.get(WINDOWS_MODE)) {
            None => Ok(WindowsMode::default()),
            Some(value) => parse_windows_mode(value),
        }
    }
}

/// Per-entry override for `name`, if the definition is an object carrying it.
fn definition_value<'a>(definition: &'a Value, name: &str) -> Option<&'a Value> {
    definition
        .as_object()
        .and_then(|o| o.get(name))
        .filter(|v| !v.is_null())
}

/// Parse a configured `windows-mode` value.
///
/// Scalars are stringified (`true` becomes `"1"`), trimmed and lowercased
/// before matching.
///
/// # Errors
///
/// Returns [`SymlinksError::InvalidArgument`] for arrays, objects and unknown
/// mode names.
pub fn parse_windows_mode(value: &Value) -> Result<WindowsMode, SymlinksError> {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => {
            return Err(SymlinksError::invalid(
                "The config option windows-mode must be a string or scalar value.",
            ));
        }
    };
    raw.trim().to_ascii_lowercase().parse()
}
