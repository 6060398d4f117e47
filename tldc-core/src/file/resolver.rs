use crate::file::error::AccessError;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Path relative to the root, empty for the root itself
    pub relative: PathBuf,
    /// Absolute path under the root, `.` and `..` removed. Symlinks are left
    /// in place so the path stays stable as a key.
    pub real_path: PathBuf,
}

/// Maps paths given by the model onto the working directory. Relative paths
/// are taken from the root; absolute paths are accepted when they point
/// inside it.
#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
}

impl Resolver {
    /// `root` must already be canonical.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, path: &str) -> Result<ResolvedPath, AccessError> {
        let requested = Path::new(path.trim());
        let joined = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            self.root.join(requested)
        };

        let real_path = normalize(&joined);
        let relative = real_path
            .strip_prefix(&self.root)
            .map_err(|_| AccessError::AccessDenied)?
            .to_path_buf();

        if relative.components().any(|c| c.as_os_str() == ".git") {
            return Err(AccessError::AccessDenied);
        }

        // A symlink inside the root may still lead out of it
        if !physical_location(&real_path).starts_with(&self.root) {
            return Err(AccessError::AccessDenied);
        }

        Ok(ResolvedPath {
            relative,
            real_path,
        })
    }
}

/// Removes `.` and `..` without touching the file system. `..` never climbs
/// above the file system root.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Where `path` actually lives once symlinks are followed. The deepest
/// existing ancestor is canonicalized and the missing tail appended, so this
/// also works for files that are about to be created.
fn physical_location(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut tail = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            let mut located = canonical;
            for name in tail.iter().rev() {
                located.push(name);
            }
            return located;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Resolver) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap().join("work");
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/lib.rs"), "").unwrap();
        (temp, Resolver::new(root))
    }

    #[test]
    fn test_relative_and_dot_paths() {
        let (_temp, resolver) = setup();
        let resolved = resolver.resolve("./src/../src/lib.rs").unwrap();
        assert_eq!(resolved.relative, PathBuf::from("src/lib.rs"));
        assert_eq!(resolved.real_path, resolver.root().join("src/lib.rs"));

        let root = resolver.resolve(".").unwrap();
        assert!(root.relative.as_os_str().is_empty());
        assert_eq!(root.real_path, resolver.root());
    }

    #[test]
    fn test_absolute_path_inside_root() {
        let (_temp, resolver) = setup();
        let absolute = resolver.root().join("src/lib.rs");
        let resolved = resolver.resolve(&absolute.to_string_lossy()).unwrap();
        assert_eq!(resolved.relative, PathBuf::from("src/lib.rs"));
    }

    #[test]
    fn test_escapes_are_denied() {
        let (_temp, resolver) = setup();
        assert_eq!(
            resolver.resolve("../outside.txt"),
            Err(AccessError::AccessDenied)
        );
        assert_eq!(
            resolver.resolve("src/../../outside.txt"),
            Err(AccessError::AccessDenied)
        );
        assert_eq!(resolver.resolve("/etc/passwd"), Err(AccessError::AccessDenied));
    }

    #[test]
    fn test_git_is_denied_at_any_depth() {
        let (_temp, resolver) = setup();
        assert_eq!(resolver.resolve(".git/config"), Err(AccessError::AccessDenied));
        assert_eq!(resolver.resolve("vendor/.git"), Err(AccessError::AccessDenied));
        assert!(resolver.resolve(".github/workflows/ci.yml").is_ok());
    }

    #[test]
    fn test_new_file_in_missing_directory() {
        let (_temp, resolver) = setup();
        let resolved = resolver.resolve("docs/new/notes.md").unwrap();
        assert_eq!(resolved.real_path, resolver.root().join("docs/new/notes.md"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_out_of_root_is_denied() {
        let (temp, resolver) = setup();
        let outside = temp.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("secret.txt"), "secret").unwrap();
        std::os::unix::fs::symlink(&outside, resolver.root().join("link")).unwrap();

        assert_eq!(
            resolver.resolve("link/secret.txt"),
            Err(AccessError::AccessDenied)
        );
        assert_eq!(
            resolver.resolve("link/created.txt"),
            Err(AccessError::AccessDenied)
        );
    }
}
