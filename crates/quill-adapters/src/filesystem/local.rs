//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use quill_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{QuillError, QuillResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn read(&self, path: &Path) -> QuillResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn write(&self, path: &Path, content: &[u8]) -> QuillResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn create_dir_all(&self, path: &Path) -> QuillResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn remove_file(&self, path: &Path) -> QuillResult<()> {
        std::fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> QuillResult<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
                .map_err(|e| map_io_error(path, e, "set permissions"))?;
        }
        #[cfg(not(unix))]
        {
            let _ = (path, mode);
        }
        Ok(())
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> QuillError {
    if e.kind() == io::ErrorKind::NotFound {
        return ApplicationError::FileNotFound {
            path: path.to_path_buf(),
        }
        .into();
    }
    ApplicationError::filesystem(path, format!("Failed to {operation}: {e}")).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_read_bytes() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let path = temp.path().join("a.bin");

        fs.write(&path, &[0, 159, 146, 150]).unwrap();

        assert!(fs.exists(&path));
        assert!(!fs.is_dir(&path));
        assert_eq!(fs.read(&path).unwrap(), [0, 159, 146, 150]);
    }

    #[test]
    fn write_does_not_create_parents() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let path = temp.path().join("nested/dir/a.txt");

        assert!(fs.write(&path, b"x").is_err());

        fs.create_dir_all(path.parent().unwrap()).unwrap();
        fs.write(&path, b"x").unwrap();
        assert!(fs.is_dir(&temp.path().join("nested")));
    }

    #[test]
    fn missing_file_maps_to_not_found() {
        let temp = TempDir::new().unwrap();
        let err = LocalFilesystem::new()
            .read(&temp.path().join("nope"))
            .unwrap_err();

        assert!(matches!(
            err,
            QuillError::Application(ApplicationError::FileNotFound { .. })
        ));
    }

    #[test]
    fn remove_file() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let path = temp.path().join("gone.txt");
        fs.write(&path, b"bye").unwrap();

        fs.remove_file(&path).unwrap();

        assert!(!fs.exists(&path));
    }

    #[cfg(unix)]
    #[test]
    fn set_permissions_applies_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let path = temp.path().join("run.sh");
        fs.write(&path, b"#!/bin/sh").unwrap();

        fs.set_permissions(&path, 0o750).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }
}
