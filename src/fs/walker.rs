//! Depth-first directory walker
//!
//! Yields every entry below a root as a tagged `WalkEntry`, directories
//! before their contents, siblings in file-name order. Symbolic links are
//! reported, never followed.

use crate::error::{CopybarError, IoResultExt, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A single entry found below the walk root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEntry {
    /// Regular file
    File {
        /// Path on disk
        path: PathBuf,
        /// Path relative to the walk root
        relative: PathBuf,
        /// Size in bytes
        size: u64,
    },
    /// Directory
    Dir {
        /// Path on disk
        path: PathBuf,
        /// Path relative to the walk root
        relative: PathBuf,
    },
    /// Symbolic link
    Symlink {
        /// Path on disk
        path: PathBuf,
        /// Path relative to the walk root
        relative: PathBuf,
        /// Where the link points
        target: PathBuf,
    },
}

impl WalkEntry {
    /// Path on disk
    pub fn path(&self) -> &Path {
        match self {
            Self::File { path, .. } | Self::Dir { path, .. } | Self::Symlink { path, .. } => path,
        }
    }

    /// Path relative to the walk root
    pub fn relative(&self) -> &Path {
        match self {
            Self::File { relative, .. }
            | Self::Dir { relative, .. }
            | Self::Symlink { relative, .. } => relative,
        }
    }

    /// Bytes this entry contributes to a copy
    pub fn size(&self) -> u64 {
        match self {
            Self::File { size, .. } => *size,
            _ => 0,
        }
    }
}

/// Iterator over the entries below a directory
pub struct Walker {
    root: PathBuf,
    inner: walkdir::IntoIter,
    skip: Option<PathBuf>,
}

impl Walker {
    /// Walk everything below `root` (the root itself is not yielded)
    pub fn new(root: &Path) -> Result<Self> {
        std::fs::symlink_metadata(root).with_path(root)?;

        let inner = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        Ok(Self {
            root: root.to_path_buf(),
            inner,
            skip: None,
        })
    }

    /// Do not descend into the directory at `path`
    pub fn skipping(mut self, path: impl Into<PathBuf>) -> Self {
        self.skip = Some(path.into());
        self
    }

    fn convert(&self, entry: walkdir::DirEntry) -> Result<Option<WalkEntry>> {
        let path = entry.path().to_path_buf();
        let relative = path
            .strip_prefix(&self.root)
            .unwrap_or(&path)
            .to_path_buf();
        let file_type = entry.file_type();

        let entry = if file_type.is_symlink() {
            let target = std::fs::read_link(&path).with_path(&path)?;
            WalkEntry::Symlink {
                path,
                relative,
                target,
            }
        } else if file_type.is_dir() {
            WalkEntry::Dir { path, relative }
        } else if file_type.is_file() {
            let size = entry
                .metadata()
                .map_err(|e| walk_error(e, &path))?
                .len();
            WalkEntry::File {
                path,
                relative,
                size,
            }
        } else {
            // Sockets, fifos and devices have no bytes to copy.
            return Ok(None);
        };
        Ok(Some(entry))
    }
}

impl Iterator for Walker {
    type Item = Result<WalkEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    return Some(Err(walk_error(e, &path)));
                }
            };

            if entry.file_type().is_dir() && self.skip.as_deref() == Some(entry.path()) {
                self.inner.skip_current_dir();
                continue;
            }

            match self.convert(entry) {
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

fn walk_error(err: walkdir::Error, path: &Path) -> CopybarError {
    let message = err.to_string();
    match err.into_io_error() {
        Some(io) => CopybarError::io(path, io),
        None => CopybarError::io(path, std::io::Error::new(std::io::ErrorKind::Other, message)),
    }
}

/// Size of a single file in bytes
pub fn file_size(path: &Path) -> Result<u64> {
    Ok(std::fs::metadata(path).with_path(path)?.len())
}

/// Total size of every regular file below `path`
pub fn folder_size(path: &Path) -> Result<u64> {
    Walker::new(path)?.try_fold(0u64, |total, entry| Ok(total + entry?.size()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        File::create(dir.path().join("b.txt"))
            .unwrap()
            .write_all(b"small file")
            .unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        File::create(dir.path().join("a/nested.bin"))
            .unwrap()
            .write_all(&vec![0u8; 1000])
            .unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();

        dir
    }

    #[test]
    fn test_walk_order() {
        let dir = create_test_dir();
        let entries: Vec<_> = Walker::new(dir.path())
            .unwrap()
            .map(|e| e.unwrap())
            .collect();

        let relative: Vec<_> = entries.iter().map(|e| e.relative().to_path_buf()).collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("a"),
                PathBuf::from("a/nested.bin"),
                PathBuf::from("b.txt"),
                PathBuf::from("empty"),
            ]
        );
        assert!(matches!(entries[0], WalkEntry::Dir { .. }));
        assert!(matches!(entries[1], WalkEntry::File { size: 1000, .. }));
    }

    #[test]
    fn test_folder_size() {
        let dir = create_test_dir();
        assert_eq!(folder_size(dir.path()).unwrap(), 1010);
        assert_eq!(file_size(&dir.path().join("b.txt")).unwrap(), 10);
    }

    #[test]
    fn test_empty_folder_size() {
        let dir = TempDir::new().unwrap();
        assert_eq!(folder_size(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(Walker::new(&missing), Err(CopybarError::NotFound(_))));
        assert!(matches!(file_size(&missing), Err(CopybarError::NotFound(_))));
    }

    #[test]
    fn test_skipping_subtree() {
        let dir = create_test_dir();
        let entries: Vec<_> = Walker::new(dir.path())
            .unwrap()
            .skipping(dir.path().join("a"))
            .map(|e| e.unwrap())
            .collect();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| !e.relative().starts_with("a")));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_not_followed() {
        let dir = create_test_dir();
        std::os::unix::fs::symlink(dir.path().join("a"), dir.path().join("link")).unwrap();

        let entries: Vec<_> = Walker::new(dir.path())
            .unwrap()
            .map(|e| e.unwrap())
            .collect();
        let link = entries
            .iter()
            .find(|e| e.relative() == Path::new("link"))
            .unwrap();
        assert!(matches!(link, WalkEntry::Symlink { .. }));
        assert_eq!(link.size(), 0);
        assert_eq!(folder_size(dir.path()).unwrap(), 1010);
    }
}
