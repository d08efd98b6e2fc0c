//! Application layer for Quill.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (GeneratorService, RecipeService)
//! - **File**: a document bound to a path behind the filesystem port
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! Document and recipe rules live in `crate::domain`; this layer only moves
//! bytes in and out and sequences steps.

pub mod error;
pub mod file;
pub mod ports;
pub mod services;

pub use services::{CommandInfo, GeneratorService, RecipeInfo, RecipeService, RunReport};

pub use file::{File, resolve_path};

// Re-export port traits (for adapter implementation)
pub use ports::{Filesystem, RecipeSource};

pub use error::ApplicationError;
