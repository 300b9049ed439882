//! Link-creation strategies and the fallback plan that orders them.
use std::fmt;
use std::path::Path;

use crate::exec::{Executor, SystemExecutor};
use crate::platform::Platform;
use crate::resources::helpers::fs::relative_path;
use crate::resources::symlink::{Symlink, WindowsMode};

/// One way of materialising a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkStrategy {
    /// Native symbolic link.
    Symlink,
    /// Directory junction (Windows only).
    Junction,
    /// Hard link to a file.
    HardLink,
    /// Plain copy of a file.
    Copy,
}

impl LinkStrategy {
    /// Name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Symlink => "symlink",
            Self::Junction => "junction",
            Self::HardLink => "hardlink",
            Self::Copy => "copy",
        }
    }
}

impl fmt::Display for LinkStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered strategies to try for one link.
///
/// Platforms without fallback only ever try a native symlink.  On Windows
/// the chain depends on `windows-mode` and on whether the target is a
/// directory.
#[must_use]
pub fn plan(platform: &Platform, mode: WindowsMode, target_is_dir: bool) -> Vec<LinkStrategy> {
    if !platform.supports_link_fallback() {
        return vec![LinkStrategy::Symlink];
    }
    match mode {
        WindowsMode::Symlink => vec![LinkStrategy::Symlink],
        WindowsMode::Copy => vec![LinkStrategy::Copy],
        WindowsMode::Junction if target_is_dir => {
            vec![LinkStrategy::Symlink, LinkStrategy::Junction]
        }
        WindowsMode::Junction => vec![
            LinkStrategy::Symlink,
            LinkStrategy::HardLink,
            LinkStrategy::Copy,
        ],
    }
}

/// A strategy that failed, with the OS error text it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFailure {
    /// Strategy that was attempted.
    pub strategy: LinkStrategy,
    /// Diagnostic text.
    pub message: String,
}

impl fmt::Display for LinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.message)
    }
}

/// Build the error message for an exhausted strategy chain.
#[must_use]
pub fn failure_message(platform: &Platform, symlink: &Symlink, failures: &[LinkFailure]) -> String {
    let link = symlink.link.display();
    let target = symlink.target.display();
    let details = format_details(failures);

    if !platform.supports_link_fallback() {
        return format!("Failed to create symlink {link} -> {target}.{details}");
    }

    match symlink.windows_mode {
        WindowsMode::Symlink => format!(
            "Failed to create symlink {link} -> {target}. Enable Windows Developer Mode or \
             configure extra.somework/composer-symlinks.windows-mode to \"junction\" or \
             \"copy\".{details}"
        ),
        mode => {
            let advice = if mode == WindowsMode::Copy {
                "Enable Windows Developer Mode to allow native symlinks."
            } else {
                "Enable Windows Developer Mode or set windows-mode to \"copy\"."
            };
            format!(
                "Failed to create link {link} -> {target} using windows-mode \"{mode}\". \
                 {advice}{details}"
            )
        }
    }
}

/// ` Details: a; b.` with duplicates removed, or an empty string.
fn format_details(failures: &[LinkFailure]) -> String {
    let mut entries: Vec<String> = Vec::new();
    for failure in failures {
        let entry = failure.to_string();
        if !failure.message.is_empty() && !entries.contains(&entry) {
            entries.push(entry);
        }
    }
    if entries.is_empty() {
        String::new()
    } else {
        format!(" Details: {}.", entries.join("; "))
    }
}

/// Primitive link operations.  Each returns the OS diagnostic on failure.
pub trait LinkOps: fmt::Debug {
    /// Create a native symlink, absolute or relative to the link's directory.
    ///
    /// # Errors
    ///
    /// Returns the OS error text.
    fn symlink(&self, target: &Path, link: &Path, absolute: bool) -> Result<(), String>;

    /// Create a directory junction.
    ///
    /// # Errors
    ///
    /// Returns the OS error text, or a message when junctions are unsupported.
    fn junction(&self, target: &Path, link: &Path) -> Result<(), String>;

    /// Create a hard link.
    ///
    /// # Errors
    ///
    /// Returns the OS error text.
    fn hard_link(&self, target: &Path, link: &Path) -> Result<(), String>;

    /// Copy a single file.
    ///
    /// # Errors
    ///
    /// Returns the OS error text, or a message when `target` is a directory.
    fn copy(&self, target: &Path, link: &Path) -> Result<(), String>;

    /// Run one strategy for `symlink`.
    ///
    /// # Errors
    ///
    /// Returns the diagnostic of the underlying operation.
    fn apply(&self, strategy: LinkStrategy, symlink: &Symlink) -> Result<(), String> {
        let (target, link) = (symlink.target.as_path(), symlink.link.as_path());
        match strategy {
            LinkStrategy::Symlink => self.symlink(target, link, symlink.absolute_path),
            LinkStrategy::Junction => self.junction(target, link),
            LinkStrategy::HardLink => self.hard_link(target, link),
            LinkStrategy::Copy => self.copy(target, link),
        }
    }
}

/// [`LinkOps`] against the real file system.
#[derive(Debug)]
pub struct SystemLinkOps {
    executor: Box<dyn Executor>,
}

impl Default for SystemLinkOps {
    fn default() -> Self {
        Self::new(Box::new(SystemExecutor))
    }
}

impl SystemLinkOps {
    /// Create link operations that spawn helper processes through `executor`.
    #[must_use]
    pub fn new(executor: Box<dyn Executor>) -> Self {
        Self { executor }
    }
}

impl LinkOps for SystemLinkOps {
    fn symlink(&self, target: &Path, link: &Path, absolute: bool) -> Result<(), String> {
        let stored = if absolute {
            target.to_path_buf()
        } else {
            let dir = link.parent().unwrap_or_else(|| Path::new("."));
            // The kernel resolves the stored value against the real directory.
            let dir = dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
            relative_path(&dir, target)
        };
        create_symlink(&stored, target.is_dir(), link).map_err(|e| e.to_string())
    }

    fn junction(&self, target: &Path, link: &Path) -> Result<(), String> {
        if !cfg!(windows) {
            return Err("junctions are only supported on Windows".to_string());
        }
        let link_str = link.to_string_lossy();
        let target_str = target.to_string_lossy();
        self.executor
            .run("cmd", &["/c", "mklink", "/J", &link_str, &target_str])
            .map(|_| ())
            .map_err(|e| format!("{e:#}"))
    }

    fn hard_link(&self, target: &Path, link: &Path) -> Result<(), String> {
        std::fs::hard_link(target, link).map_err(|e| e.to_string())
    }

    fn copy(&self, target: &Path, link: &Path) -> Result<(), String> {
        if target.is_dir() {
            return Err(format!(
                "{} is a directory; only single files can be copied",
                target.display()
            ));
        }
        std::fs::copy(target, link)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

#[cfg(unix)]
fn create_symlink(stored: &Path, _target_is_dir: bool, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(stored, link)
}

#[cfg(windows)]
fn create_symlink(stored: &Path, target_is_dir: bool, link: &Path) -> std::io::Result<()> {
    if target_is_dir {
        std::os::windows::fs::symlink_dir(stored, link)
    } else {
        std::os::windows::fs::symlink_file(stored, link)
    }
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_stored: &Path, _target_is_dir: bool, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}
