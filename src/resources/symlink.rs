//! The desired-link record handed from the factory to the processor.
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::SymlinksError;

/// Fallback selector used where native symlinks may be unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WindowsMode {
    /// Only native symlinks; failure is fatal.
    Symlink,
    /// Native symlink, then a junction (directories) or hard link and copy
    /// (files).
    #[default]
    Junction,
    /// Always copy the target file instead of linking.
    Copy,
}

impl WindowsMode {
    /// Configuration spelling of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Symlink => "symlink",
            Self::Junction => "junction",
            Self::Copy => "copy",
        }
    }
}

impl fmt::Display for WindowsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowsMode {
    type Err = SymlinksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "symlink" => Ok(Self::Symlink),
            "junction" => Ok(Self::Junction),
            "copy" => Ok(Self::Copy),
            other => Err(SymlinksError::invalid(format!(
                "Unknown windows-mode \"{other}\". Expected one of: symlink, junction, copy."
            ))),
        }
    }
}

/// One link to realise on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symlink {
    /// Canonical path of the existing source.
    pub target: PathBuf,
    /// Absolute path to create.
    pub link: PathBuf,
    /// Store an absolute target in the link instead of a relative one.
    pub absolute_path: bool,
    /// Replace whatever already occupies `link`.
    pub force_create: bool,
    /// Fallback strategy selector.
    pub windows_mode: WindowsMode,
}

impl Symlink {
    /// Create a record with default options.
    #[must_use]
    pub fn new(target: impl Into<PathBuf>, link: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            link: link.into(),
            absolute_path: false,
            force_create: false,
            windows_mode: WindowsMode::default(),
        }
    }

    /// Set [`absolute_path`](Self::absolute_path).
    #[must_use]
    pub const fn with_absolute_path(mut self, absolute_path: bool) -> Self {
        self.absolute_path = absolute_path;
        self
    }

    /// Set [`force_create`](Self::force_create).
    #[must_use]
    pub const fn with_force_create(mut self, force_create: bool) -> Self {
        self.force_create = force_create;
        self
    }

    /// Set [`windows_mode`](Self::windows_mode).
    #[must_use]
    pub const fn with_windows_mode(mut self, windows_mode: WindowsMode) -> Self {
        self.windows_mode = windows_mode;
        self
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Symlink::new("/srv/app/target", "/srv/app/link");
        assert!(!s.absolute_path);
        assert!(!s.force_create);
        assert_eq!(s.windows_mode, WindowsMode::Junction);
    }

    #[test]
    fn builders_set_options() {
        let s = Symlink::new("/t", "/l")
            .with_absolute_path(true)
            .with_force_create(true)
            .with_windows_mode(WindowsMode::Copy);
        assert!(s.absolute_path);
        assert!(s.force_create);
        assert_eq!(s.windows_mode, WindowsMode::Copy);
    }

    #[test]
    fn windows_mode_round_trips_through_str() {
        for mode in [WindowsMode::Symlink, WindowsMode::Junction, WindowsMode::Copy] {
            assert_eq!(mode.as_str().parse::<WindowsMode>().unwrap(), mode);
            assert_eq!(mode.to_string(), mode.as_str());
        }
    }

    #[test]
    fn unknown_windows_mode_is_invalid_argument() {
        let err = "hardlink".parse::<WindowsMode>().unwrap_err();
        assert!(matches!(err, SymlinksError::InvalidArgument(_)));
        assert!(err.to_string().starts_with("Unknown windows-mode \"hardlink\""));
    }
}
