//! Drift report comparing configured links and the registry with the disk.
use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::platform::Platform;
use crate::resources::helpers::fs::{is_symlink, path_exists, resolve_link_target};

/// Health of one link path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// A symlink pointing at the expected target.
    Ok,
    /// Nothing exists at the link path.
    Missing,
    /// A symlink pointing somewhere else.
    Mismatch,
    /// A regular file or directory occupies the link path.
    Unexpected,
    /// A symlink whose target no longer exists.
    Broken,
    /// A registry entry whose path is gone.
    Stale,
    /// A registry entry that is still on disk but no longer configured.
    Orphan,
}

impl Status {
    const fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Missing => "MISSING",
            Self::Mismatch => "MISMATCH",
            Self::Unexpected => "UNEXPECTED",
            Self::Broken => "BROKEN",
            Self::Stale => "STALE",
            Self::Orphan => "ORPHAN",
        }
    }
}

/// Which source a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// The current configuration.
    Configured,
    /// The registry file only.
    Registry,
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Link path.
    pub link: String,
    /// Target the link should point at.
    pub expected: String,
    /// Resolved on-disk target, if anything exists at `link`.
    pub actual: Option<String>,
    /// Health classification.
    pub status: Status,
    /// Where the row came from.
    #[serde(rename = "type")]
    pub source: Source,
}

/// Full status report.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Rows for configured links, sorted by link.
    pub configured: Vec<Row>,
    /// Rows for registry entries that are no longer configured, sorted by link.
    pub registry: Vec<Row>,
    #[serde(skip)]
    fold_case: bool,
}

/// What lives at a link path.
enum Found {
    Missing,
    Other(String),
    Link(String),
    Dangling(String),
}

fn inspect(link: &Path) -> Found {
    if is_symlink(link) {
        return match resolve_link_target(link) {
            Some(target) if path_exists(&target) => {
                Found::Link(target.to_string_lossy().into_owned())
            }
            Some(target) => Found::Dangling(target.to_string_lossy().into_owned()),
            None => Found::Dangling(String::new()),
        };
    }
    if path_exists(link) {
        let actual = dunce::canonicalize(link).unwrap_or_else(|_| link.to_path_buf());
        return Found::Other(actual.to_string_lossy().into_owned());
    }
    Found::Missing
}

/// Inspect every configured link and every registry entry not configured.
#[must_use]
pub fn build(
    platform: &Platform,
    configured: &BTreeMap<String, String>,
    registry: &BTreeMap<String, String>,
) -> StatusReport {
    let fold_case = platform.is_windows();

    let configured_rows = configured
        .iter()
        .map(|(link, expected)| {
            let (status, actual) = match inspect(Path::new(link)) {
                Found::Missing => (Status::Missing, None),
                Found::Other(actual) => (Status::Unexpected, Some(actual)),
                Found::Dangling(actual) => (Status::Broken, Some(actual)),
                Found::Link(actual) => {
                    let status = if same_path(&actual, expected, fold_case) {
                        Status::Ok
                    } else {
                        Status::Mismatch
                    };
                    (status, Some(actual))
                }
            };
            Row {
                link: link.clone(),
                expected: expected.clone(),
                actual: actual.filter(|a| !a.is_empty()),
                status,
                source: Source::Configured,
            }
        })
        .collect();

    let registry_rows = registry
        .iter()
        .filter(|(link, _)| !configured.contains_key(*link))
        .map(|(link, expected)| {
            let (status, actual) = match inspect(Path::new(link)) {
                Found::Missing => (Status::Stale, None),
                Found::Dangling(actual) => (Status::Broken, Some(actual)),
                Found::Link(actual) | Found::Other(actual) => (Status::Orphan, Some(actual)),
            };
            Row {
                link: link.clone(),
                expected: expected.clone(),
                actual: actual.filter(|a| !a.is_empty()),
                status,
                source: Source::Registry,
            }
        })
        .collect();

    StatusReport {
        configured: configured_rows,
        registry: registry_rows,
        fold_case,
    }
}

/// Compare paths, folding case and separators when `fold_case` is set.
fn same_path(a: &str, b: &str, fold_case: bool) -> bool {
    if fold_case {
        fold(a) == fold(b)
    } else {
        a == b
    }
}

fn fold(path: &str) -> String {
    path.replace('\\', "/").to_lowercase()
}

impl StatusReport {
    /// Whether any row is not [`Status::Ok`].
    #[must_use]
    pub fn has_problems(&self) -> bool {
        self.configured
            .iter()
            .chain(&self.registry)
            .any(|row| row.status != Status::Ok)
    }

    /// Render one row as a human-readable line.
    #[must_use]
    pub fn format_line(&self, row: &Row) -> String {
        let mut line = format!("  [{}] {} -> {}", row.status.label(), row.link, row.expected);
        if let Some(actual) = &row.actual
            && !same_path(actual, &row.expected, self.fold_case)
        {
            line.push_str(&format!(" (actual: {actual})"));
        }
        match row.status {
            Status::Missing => line.push_str(" (missing)"),
            Status::Broken => line.push_str(" (broken link)"),
            _ => {}
        }
        if row.source == Source::Registry {
            line.push_str(" [registry]");
        }
        line
    }

    /// Render the text report, one entry per line.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec!["Configured symlinks".to_string()];
        if self.configured.is_empty() {
            lines.push("  (none)".to_string());
        }
        lines.extend(self.configured.iter().map(|row| self.format_line(row)));

        if !self.registry.is_empty() {
            lines.push("Registry entries".to_string());
            lines.extend(self.registry.iter().map(|row| self.format_line(row)));
        }
        lines
    }

    /// Serialize as pretty JSON with four-space indentation.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
