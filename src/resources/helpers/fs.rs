//! File-system helpers shared by the factory, processor and registry.
use std::io;
use std::path::{Component, Path, PathBuf};

/// Whether anything occupies `path`, including a dangling symlink.
#[must_use]
pub fn path_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Whether `path` itself is a symlink (or a junction on Windows).
#[must_use]
pub fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .is_ok_and(|m| m.file_type().is_symlink())
}

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns the underlying I/O error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Remove whatever occupies `path`.
///
/// Symlinks and junctions are unlinked without touching what they point to,
/// real directories are removed recursively and anything else is removed as
/// a file.  Does nothing if `path` does not exist.
///
/// # Errors
///
/// Returns the underlying I/O error if removal fails.
pub fn remove_path(path: &Path) -> io::Result<()> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    if meta.file_type().is_symlink() {
        remove_link(path, &meta)
    } else if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

/// Unlink a symlink or junction.
///
/// On Windows, directory symlinks and junctions must be removed with
/// `remove_dir`; if that is denied (OS error 5) we retry with `cmd /c rmdir`.
fn remove_link(path: &Path, meta: &std::fs::Metadata) -> io::Result<()> {
    if is_dir_like(meta) {
        match std::fs::remove_dir(path) {
            Ok(()) => Ok(()),
            #[cfg(windows)]
            Err(e) if e.raw_os_error() == Some(5) => remove_dir_fallback(path),
            Err(e) => Err(e),
        }
    } else {
        std::fs::remove_file(path)
    }
}

/// On Windows, `symlink_metadata().is_dir()` returns `false` for directory
/// symlinks, so check the raw `FILE_ATTRIBUTE_DIRECTORY` bit instead.
fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}

#[cfg(windows)]
fn remove_dir_fallback(path: &Path) -> io::Result<()> {
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    use std::os::windows::process::CommandExt;
    let output = std::process::Command::new("cmd")
        .arg("/c")
        .arg("rmdir")
        .arg("/q")
        .arg(path)
        .creation_flags(CREATE_NO_WINDOW)
        .output()?;
    if output.status.success() {
        Ok(())
    } else {
        Err(io::Error::other(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}

/// Lexically normalise `path`: drop `.` components and fold `..` into the
/// preceding component.  Does not touch the file system.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Path of `target` relative to the directory `base`.
///
/// Both paths should be absolute and normalised.  Returns `target` unchanged
/// when they share no root (e.g. different Windows drives).
#[must_use]
pub fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base: Vec<Component<'_>> = base.components().collect();
    let target_parts: Vec<Component<'_>> = target.components().collect();

    let same_root = base.first() == target_parts.first();
    if !same_root {
        return target.to_path_buf();
    }

    let common = base
        .iter()
        .zip(&target_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base.len() {
        out.push("..");
    }
    for part in target_parts.iter().skip(common) {
        out.push(part);
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Resolve what `link` currently points at.
///
/// For a symlink this reads the link (relative values resolve against the
/// link's directory) and canonicalises the result when it exists, otherwise
/// returns the joined path.  For any other existing path it returns the
/// canonical path.  Returns `None` when nothing exists at `link`.
#[must_use]
pub fn resolve_link_target(link: &Path) -> Option<PathBuf> {
    if is_symlink(link) {
        let raw = std::fs::read_link(link).ok()?;
        let combined = if raw.is_absolute() {
            raw
        } else {
            let dir = link.parent().unwrap_or_else(|| Path::new("."));
            let base = dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
            base.join(raw)
        };
        return Some(dunce::canonicalize(&combined).unwrap_or_else(|_| normalize_path(&combined)));
    }

    if path_exists(link) {
        return dunce::canonicalize(link).ok();
    }
    None
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // ensure_parent_dir
    // -----------------------------------------------------------------------

    #[test]
    fn ensure_parent_dir_creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("file.txt");
        ensure_parent_dir(&nested).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
    }

    #[test]
    fn ensure_parent_dir_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blocker"), "x").unwrap();
        assert!(ensure_parent_dir(&dir.path().join("blocker").join("link")).is_err());
    }

    // -----------------------------------------------------------------------
    // remove_path
    // -----------------------------------------------------------------------

    #[test]
    fn remove_path_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, "content").unwrap();
        remove_path(&file).unwrap();
        assert!(!path_exists(&file));
    }

    #[test]
    fn remove_path_removes_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("tree");
        std::fs::create_dir_all(tree.join("nested")).unwrap();
        std::fs::write(tree.join("nested").join("f"), "x").unwrap();
        remove_path(&tree).unwrap();
        assert!(!path_exists(&tree));
    }

    #[test]
    fn remove_path_noop_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        remove_path(&dir.path().join("nothing")).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn remove_path_unlinks_directory_symlink_without_touching_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep.txt"), "x").unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        remove_path(&link).unwrap();

        assert!(!path_exists(&link));
        assert!(target.join("keep.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn remove_path_removes_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink("/nonexistent/target", &link).unwrap();
        assert!(path_exists(&link));
        remove_path(&link).unwrap();
        assert!(!path_exists(&link));
    }

    // -----------------------------------------------------------------------
    // normalize_path / relative_path
    // -----------------------------------------------------------------------

    #[test]
    fn normalize_path_folds_dots() {
        assert_eq!(
            normalize_path(Path::new("/srv/app/./a/../b")),
            PathBuf::from("/srv/app/b")
        );
        assert_eq!(normalize_path(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn relative_path_to_sibling_directory() {
        assert_eq!(
            relative_path(Path::new("/srv/app/dir"), Path::new("/srv/app/target/file.txt")),
            PathBuf::from("../target/file.txt")
        );
    }

    #[test]
    fn relative_path_to_child() {
        assert_eq!(
            relative_path(Path::new("/srv/app"), Path::new("/srv/app/public")),
            PathBuf::from("public")
        );
    }

    #[test]
    fn relative_path_to_self() {
        assert_eq!(
            relative_path(Path::new("/srv/app"), Path::new("/srv/app")),
            PathBuf::from(".")
        );
    }

    // -----------------------------------------------------------------------
    // resolve_link_target
    // -----------------------------------------------------------------------

    #[test]
    fn resolve_missing_path_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_link_target(&dir.path().join("missing")), None);
    }

    #[test]
    fn resolve_plain_file_is_canonical_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, "x").unwrap();
        assert_eq!(
            resolve_link_target(&file),
            Some(dunce::canonicalize(&file).unwrap())
        );
    }

    #[cfg(unix)]
    #[test]
    fn resolve_relative_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        std::fs::create_dir(root.join("target")).unwrap();
        std::fs::write(root.join("target").join("file.txt"), "x").unwrap();
        std::fs::create_dir(root.join("dir")).unwrap();
        let link = root.join("dir").join("link.txt");
        std::os::unix::fs::symlink("../target/file.txt", &link).unwrap();

        assert_eq!(
            resolve_link_target(&link),
            Some(root.join("target").join("file.txt"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn resolve_dangling_symlink_returns_joined_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        let link = root.join("link");
        std::os::unix::fs::symlink("gone/file.txt", &link).unwrap();
        assert_eq!(
            resolve_link_target(&link),
            Some(root.join("gone").join("file.txt"))
        );
    }
}
