//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use quill_core::{
    application::{ApplicationError, ports::Filesystem},
    error::QuillResult,
};

/// In-memory filesystem for testing.
///
/// Clones share the same storage, so a test can hand one clone to a service
/// and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    directories: HashSet<PathBuf>,
    modes: HashMap<PathBuf, u32>,
}

impl MemoryFilesystemInner {
    fn add_parents(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        if let Some(parent) = path.parent() {
            for component in parent.components() {
                current.push(component);
                self.directories.insert(current.clone());
            }
        }
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file and its parent directories (testing helper).
    pub fn with_file(self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Self {
        self.insert(path, content);
        self
    }

    /// Add or replace a file and create its parent directories.
    pub fn insert(&self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) {
        if let Ok(mut inner) = self.inner.write() {
            let path = path.as_ref();
            inner.add_parents(path);
            inner
                .files
                .insert(path.to_path_buf(), content.as_ref().to_vec());
        }
    }

    /// Read a file's content as text (testing helper).
    pub fn read_file(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner
            .files
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// The permission bits last set on a file.
    pub fn mode(&self, path: impl AsRef<Path>) -> Option<u32> {
        let inner = self.inner.read().ok()?;
        inner.modes.get(path.as_ref()).copied()
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Clear all contents.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.files.clear();
            inner.directories.clear();
            inner.modes.clear();
        }
    }

    fn lock_error(path: &Path) -> ApplicationError {
        ApplicationError::filesystem(path, "memory filesystem lock poisoned")
    }
}

impl Filesystem for MemoryFilesystem {
    fn read(&self, path: &Path) -> QuillResult<Vec<u8>> {
        let inner = self.inner.read().map_err(|_| Self::lock_error(path))?;
        inner.files.get(path).cloned().ok_or_else(|| {
            ApplicationError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into()
        })
    }

    fn write(&self, path: &Path, content: &[u8]) -> QuillResult<()> {
        let mut inner = self.inner.write().map_err(|_| Self::lock_error(path))?;

        // Ensure parent exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "Parent directory does not exist".into(),
                }
                .into());
            }
        }

        inner.files.insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> QuillResult<()> {
        let mut inner = self.inner.write().map_err(|_| Self::lock_error(path))?;

        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            inner.directories.insert(current.clone());
        }

        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn remove_file(&self, path: &Path) -> QuillResult<()> {
        let mut inner = self.inner.write().map_err(|_| Self::lock_error(path))?;

        if inner.files.remove(path).is_none() {
            return Err(ApplicationError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }
        inner.modes.remove(path);
        Ok(())
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> QuillResult<()> {
        let mut inner = self.inner.write().map_err(|_| Self::lock_error(path))?;

        if !inner.files.contains_key(path) {
            return Err(ApplicationError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }
        inner.modes.insert(path.to_path_buf(), mode);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_parent_directory() {
        let fs = MemoryFilesystem::new();
        let path = Path::new("/project/src/lib.rs");

        assert!(fs.write(path, b"").is_err());

        fs.create_dir_all(Path::new("/project/src")).unwrap();
        fs.write(path, b"mod a;").unwrap();

        assert!(fs.is_dir(Path::new("/project")));
        assert_eq!(fs.read_file(path).as_deref(), Some("mod a;"));
    }

    #[test]
    fn clones_share_storage() {
        let fs = MemoryFilesystem::new().with_file("/a/b.txt", "hello");
        let other = fs.clone();

        other.remove_file(Path::new("/a/b.txt")).unwrap();

        assert!(!fs.exists(Path::new("/a/b.txt")));
        assert!(fs.exists(Path::new("/a")));
        assert!(fs.list_files().is_empty());
    }

    #[test]
    fn missing_files_are_not_found() {
        let fs = MemoryFilesystem::new();
        let path = Path::new("/nope");

        assert!(fs.read(path).is_err());
        assert!(fs.remove_file(path).is_err());
        assert!(fs.set_permissions(path, 0o644).is_err());
    }

    #[test]
    fn permissions_are_recorded() {
        let fs = MemoryFilesystem::new().with_file("/bin/run", "#!/bin/sh");

        fs.set_permissions(Path::new("/bin/run"), 0o755).unwrap();

        assert_eq!(fs.mode("/bin/run"), Some(0o755));
    }
}
