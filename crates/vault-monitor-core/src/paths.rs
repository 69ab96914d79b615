//! Path resolution and containment checks for client-supplied paths

use crate::error::Result;
use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. Does not touch the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    // `..` above the root stays at the root
                    if !out.has_root() {
                        out.push(component);
                    }
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolve a path to canonical absolute form.
///
/// Existing paths are canonicalized (symlinks followed). For paths that do not
/// exist, the deepest existing ancestor is canonicalized and the remaining
/// components are appended after lexical normalization.
pub fn resolve(path: &Path) -> Result<PathBuf> {
    let joined = std::env::current_dir()?.join(path);
    if let Ok(canonical) = joined.canonicalize() {
        return Ok(canonical);
    }

    let absolute = normalize(&joined);
    for ancestor in absolute.ancestors().skip(1) {
        if let Ok(canonical) = ancestor.canonicalize() {
            if let Ok(rest) = absolute.strip_prefix(ancestor) {
                return Ok(canonical.join(rest));
            }
        }
    }
    Ok(absolute)
}

/// Resolve `candidate` and return it only if it is a strict descendant of
/// `root`. Comparison is per path component, so `/data/backups-evil` is not
/// inside `/data/backups`.
pub fn resolve_within(root: &Path, candidate: &Path) -> Result<Option<PathBuf>> {
    let root = resolve(root)?;
    let resolved = resolve(candidate)?;

    if resolved != root && resolved.starts_with(&root) {
        Ok(Some(resolved))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_rejects_paths_outside_root() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let root = temp_dir.path().join("backups");
        std::fs::create_dir_all(&root)?;

        assert_eq!(resolve_within(&root, Path::new("/etc/passwd"))?, None);
        assert_eq!(
            resolve_within(&root, Path::new("/data/backups/never-there.sql"))?,
            None
        );
        assert_eq!(resolve_within(&root, &root.join("../outside.sql"))?, None);
        assert_eq!(resolve_within(&root, &root)?, None);

        Ok(())
    }

    #[test]
    fn test_sibling_directory_with_common_prefix_is_rejected() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let root = temp_dir.path().join("backups");
        let sibling = temp_dir.path().join("backups-evil");
        std::fs::create_dir_all(&root)?;
        std::fs::create_dir_all(&sibling)?;
        std::fs::write(sibling.join("dump.sql"), "select 1;")?;

        assert_eq!(resolve_within(&root, &sibling.join("dump.sql"))?, None);

        Ok(())
    }

    #[test]
    fn test_accepts_descendants_existing_or_not() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let root = temp_dir.path().join("backups");
        std::fs::create_dir_all(root.join("daily"))?;
        std::fs::write(root.join("daily/dump.sql"), "select 1;")?;

        let canonical_root = root.canonicalize()?;

        assert_eq!(
            resolve_within(&root, &root.join("daily/./dump.sql"))?,
            Some(canonical_root.join("daily/dump.sql"))
        );
        assert_eq!(
            resolve_within(&root, &root.join("daily/../missing.sql"))?,
            Some(canonical_root.join("missing.sql"))
        );

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_is_rejected() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let root = temp_dir.path().join("backups");
        let outside = temp_dir.path().join("secret.sql");
        std::fs::create_dir_all(&root)?;
        std::fs::write(&outside, "secret")?;
        std::os::unix::fs::symlink(&outside, root.join("link.sql"))?;

        assert_eq!(resolve_within(&root, &root.join("link.sql"))?, None);

        Ok(())
    }
}
