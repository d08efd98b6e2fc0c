//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `quill-adapters` crate provides implementations.

use std::path::Path;

use crate::domain::Recipe;
use crate::error::QuillResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `quill_adapters::filesystem::LocalFilesystem` (production)
/// - `quill_adapters::filesystem::MemoryFilesystem` (testing)
///
/// ## Design Notes
///
/// - Content is raw bytes; text decoding and binary sniffing happen in
///   [`crate::application::File`]
/// - Writing a file does not create its parent directories
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Read a whole file.
    fn read(&self, path: &Path) -> QuillResult<Vec<u8>>;

    /// Create or truncate a file and write `content`.
    fn write(&self, path: &Path, content: &[u8]) -> QuillResult<()>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> QuillResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is an existing directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Remove a single file.
    fn remove_file(&self, path: &Path) -> QuillResult<()>;

    /// Set Unix permission bits. A no-op where modes do not exist.
    fn set_permissions(&self, path: &Path, mode: u32) -> QuillResult<()>;
}

/// Port for recipe discovery.
///
/// Implemented by:
/// - `quill_adapters::recipe_loader::RecipeLoader` (directories of TOML manifests)
#[cfg_attr(test, mockall::automock)]
pub trait RecipeSource: Send + Sync {
    /// Every recipe this source knows about, sorted by name.
    fn list(&self) -> QuillResult<Vec<Recipe>>;
}
