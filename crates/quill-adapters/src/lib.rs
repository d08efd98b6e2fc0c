//! Infrastructure adapters for Quill.
//!
//! This crate implements the ports defined in `quill-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod filesystem;
pub mod recipe_loader;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use recipe_loader::{RecipeLoader, RecipeManifest};
