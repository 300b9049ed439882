//! Placeholder expansion and relativity validation for configured paths.
use std::path::Path;

use crate::config::environment::Environment;
use crate::error::SymlinksError;

const PROJECT_DIR: &str = "%project-dir%";
const VENDOR_DIR: &str = "%vendor-dir%";
const ENV_OPEN: &str = "%env(";
const ENV_CLOSE: &str = ")%";

/// Result of expanding one configured string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// The string after substitution.
    pub value: String,
    /// Whether at least one placeholder was substituted.
    pub expanded: bool,
}

/// Expands `%project-dir%`, `%vendor-dir%` and `%env(NAME)%`.
#[derive(Debug, Clone, Copy)]
pub struct Placeholders<'a> {
    project_dir: &'a Path,
    vendor_dir: Option<&'a Path>,
    env: &'a dyn Environment,
}

impl<'a> Placeholders<'a> {
    /// Create an expander.  `%vendor-dir%` is left untouched when
    /// `vendor_dir` is `None`.
    #[must_use]
    pub const fn new(
        project_dir: &'a Path,
        vendor_dir: Option<&'a Path>,
        env: &'a dyn Environment,
    ) -> Self {
        Self {
            project_dir,
            vendor_dir,
            env,
        }
    }

    /// Substitute every known placeholder in `raw`.
    #[must_use]
    pub fn expand(&self, raw: &str) -> Expansion {
        let mut expanded = false;
        let mut value = raw.to_string();

        if value.contains(PROJECT_DIR) {
            value = value.replace(PROJECT_DIR, &path_string(self.project_dir));
            expanded = true;
        }

        if let Some(vendor_dir) = self.vendor_dir
            && value.contains(VENDOR_DIR)
        {
            value = value.replace(VENDOR_DIR, &path_string(vendor_dir));
            expanded = true;
        }

        let (value, env_expanded) = self.expand_env(&value);
        Expansion {
            value,
            expanded: expanded || env_expanded,
        }
    }

    fn expand_env(&self, input: &str) -> (String, bool) {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        let mut expanded = false;

        while let Some((before, after_open)) = rest.split_once(ENV_OPEN) {
            let Some((name, after_close)) = after_open.split_once(ENV_CLOSE) else {
                break;
            };
            out.push_str(before);
            if name.is_empty() || name.contains('%') {
                out.push_str(ENV_OPEN);
                rest = after_open;
                continue;
            }
            out.push_str(&self.env.var(name).unwrap_or_default());
            rest = after_close;
            expanded = true;
        }

        out.push_str(rest);
        (out, expanded)
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Whether a configured path string is absolute on any platform.
///
/// Recognises a leading `/` or `\`, a drive prefix such as `C:` and URL
/// schemes such as `phar://`.
#[must_use]
pub fn is_absolute_path(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('\\') {
        return true;
    }

    let bytes = path.as_bytes();
    if let [drive, b':', ..] = bytes
        && drive.is_ascii_alphabetic()
    {
        return true;
    }

    path.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Which side of a definition a path belongs to, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRole {
    /// The existing source.
    Target,
    /// The path to create.
    Link,
}

impl PathRole {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Target => "target",
            Self::Link => "link",
        }
    }
}

/// Reject literal absolute paths.  Paths that became absolute through
/// placeholder expansion are accepted.
///
/// # Errors
///
/// Returns [`SymlinksError::InvalidArgument`] naming the raw configured value.
pub fn validate_relative(
    role: PathRole,
    raw: &str,
    expansion: &Expansion,
) -> Result<(), SymlinksError> {
    if !expansion.expanded && is_absolute_path(&expansion.value) {
        return Err(SymlinksError::invalid(format!(
            "Invalid symlink {} path {raw}. It must be relative",
            role.as_str()
        )));
    }
    Ok(())
}
