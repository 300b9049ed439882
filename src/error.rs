//! Domain-specific error types for the symlink engine.
//!
//! Internal modules return typed errors ([`SymlinksError`], [`ManifestError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error taxonomy
//!
//! ```text
//! SymlinksError
//! ├── InvalidArgument — the configuration is structurally or semantically wrong
//! ├── LinkDirectory   — the destination is occupied or its parent cannot be created
//! └── Runtime         — a filesystem operation failed (OS error text embedded)
//!
//! ManifestError       — composer.json cannot be read or parsed
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building and realising symlinks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymlinksError {
    /// The configuration is invalid (empty link, absolute path, unknown enum value, ...).
    #[error("{0}")]
    InvalidArgument(String),

    /// Something already occupies the destination, or the destination's
    /// parent directory could not be created.
    ///
    /// Reported as a skip rather than a hard failure by the orchestration layer.
    #[error("{0}")]
    LinkDirectory(String),

    /// A link, junction, hard link, copy or unlink operation failed.
    #[error("{0}")]
    Runtime(String),
}

impl SymlinksError {
    /// Build an [`SymlinksError::InvalidArgument`] from anything string-like.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Return `true` for the "skip with notice" class of errors.
    #[must_use]
    pub const fn is_link_directory(&self) -> bool {
        matches!(self, Self::LinkDirectory(_))
    }
}

/// Errors that arise while reading the project manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("IO error reading manifest {}: {source}", path.display())]
    Read {
        /// Path to the manifest that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest is not valid JSON.
    #[error("Invalid JSON in {}: {source}", path.display())]
    Parse {
        /// Path to the manifest that failed to parse.
        path: PathBuf,
        /// Underlying parser error.
        source: serde_json::Error,
    },

    /// A manifest section that must be an object has another JSON type.
    #[error("The {key} setting in {} must be an object", path.display())]
    NotAnObject {
        /// Path to the offending manifest.
        path: PathBuf,
        /// Dotted key of the offending section.
        key: String,
    },
}
