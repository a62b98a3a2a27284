//! Recursive directory enumeration, one directory level at a time.

use super::CoreError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One level of the tree: a directory and the names of its direct children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkLevel {
    pub dir: PathBuf,
    pub subdirs: Vec<String>,
    pub files: Vec<String>,
}

/// A lazy, top-down walk yielding one [`WalkLevel`] per directory.
///
/// Children are listed in file-name order. Directories that cannot be read are
/// skipped silently, and symlinked directories are reported but not entered.
/// Each walker holds no state beyond its pending stack, so creating a new one
/// re-walks from scratch.
pub struct TreeWalker {
    pending: Vec<PathBuf>,
}

impl TreeWalker {
    /// Validates `root` and prepares a walk. Fails before touching the tree if
    /// `root` is not an existing directory.
    pub fn new(root: &Path) -> Result<Self, CoreError> {
        validate_root(root)?;
        Ok(Self {
            pending: vec![root.to_path_buf()],
        })
    }

    fn read_level(dir: &Path) -> Option<(WalkLevel, Vec<PathBuf>)> {
        let mut level = WalkLevel {
            dir: dir.to_path_buf(),
            subdirs: Vec::new(),
            files: Vec::new(),
        };
        let mut descend = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                // The directory itself could not be listed.
                Err(e) if e.depth() == 0 => return None,
                Err(_) => continue,
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry.file_type();
            if file_type.is_dir() {
                descend.push(entry.into_path());
                level.subdirs.push(name);
            } else if file_type.is_symlink() && entry.path().is_dir() {
                level.subdirs.push(name);
            } else {
                level.files.push(name);
            }
        }

        Some((level, descend))
    }
}

impl Iterator for TreeWalker {
    type Item = WalkLevel;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(dir) = self.pending.pop() {
            if let Some((level, descend)) = Self::read_level(&dir) {
                // Reversed so the first subdirectory is visited next.
                self.pending.extend(descend.into_iter().rev());
                return Some(level);
            }
        }
        None
    }
}

/// Fails with `CoreError::InvalidDirectory` unless `root` is an existing directory.
pub fn validate_root(root: &Path) -> Result<(), CoreError> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(CoreError::InvalidDirectory(root.to_path_buf()))
    }
}

/// Every regular (non-directory) file under `root`, in walk order.
pub fn collect_all_files(root: &Path) -> Result<Vec<PathBuf>, CoreError> {
    Ok(TreeWalker::new(root)?
        .flat_map(|level| {
            let dir = level.dir;
            level
                .files
                .into_iter()
                .map(move |name| dir.join(name))
                .collect::<Vec<_>>()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> TempDir {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("README.md"), "# readme").unwrap();
        fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("src/nested/deep.rs"), "").unwrap();
        fs::write(root.join("docs/guide.txt"), "guide").unwrap();
        temp
    }

    #[test]
    fn walks_top_down_in_name_order() {
        let temp = setup();
        let root = temp.path();
        let levels: Vec<_> = TreeWalker::new(root).unwrap().collect();

        assert_eq!(levels.len(), 4);
        assert_eq!(levels[0].dir, root);
        assert_eq!(levels[0].subdirs, vec!["docs", "src"]);
        assert_eq!(levels[0].files, vec!["README.md"]);
        assert_eq!(levels[1].dir, root.join("docs"));
        assert_eq!(levels[2].dir, root.join("src"));
        assert_eq!(levels[2].files, vec!["main.rs"]);
        assert_eq!(levels[3].dir, root.join("src/nested"));
        assert_eq!(levels[3].files, vec!["deep.rs"]);
    }

    #[test]
    fn walking_again_starts_over() {
        let temp = setup();
        let first: Vec<_> = TreeWalker::new(temp.path()).unwrap().collect();
        let second: Vec<_> = TreeWalker::new(temp.path()).unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_missing_root() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("nope");
        assert!(matches!(
            TreeWalker::new(&missing),
            Err(CoreError::InvalidDirectory(p)) if p == missing
        ));
    }

    #[test]
    fn rejects_file_as_root() {
        let temp = setup();
        assert!(matches!(
            TreeWalker::new(&temp.path().join("README.md")),
            Err(CoreError::InvalidDirectory(_))
        ));
    }

    #[test]
    fn collects_files_only() {
        let temp = setup();
        let root = temp.path();
        let files = collect_all_files(root).unwrap();
        assert_eq!(
            files,
            vec![
                root.join("README.md"),
                root.join("docs/guide.txt"),
                root.join("src/main.rs"),
                root.join("src/nested/deep.rs"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        if crate::utils::test_helpers::running_as_root() {
            return;
        }

        let temp = setup();
        let locked = temp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("secret.txt"), "x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let levels: Vec<_> = TreeWalker::new(temp.path()).unwrap().collect();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(levels[0].subdirs.contains(&"locked".to_string()));
        assert!(levels.iter().all(|l| l.dir != locked));
    }
}
