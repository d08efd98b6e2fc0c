//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not document
//! rules. Document and recipe rule violations are `DomainError` from
//! `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::{ErrorCategory, QuillError};

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// A file a step or command needs does not exist.
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// No recipe with this name in any search path.
    #[error("Recipe '{name}' not found")]
    RecipeNotFound { name: String, available: Vec<String> },

    /// The recipe exists but has no such command.
    #[error("Recipe '{recipe}' has no command '{command}'")]
    CommandNotFound {
        recipe: String,
        command: String,
        available: Vec<String>,
    },

    /// A recipe manifest could not be read or parsed.
    #[error("Failed to load recipe at {path}: {reason}")]
    RecipeLoad { path: PathBuf, reason: String },

    /// A step of a command failed; earlier steps stay applied.
    #[error("Step {index} ({action} {target}) failed: {source}")]
    StepFailed {
        index: usize,
        action: &'static str,
        target: String,
        source: Box<QuillError>,
    },

    /// Validation failed (application-level, not domain).
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl ApplicationError {
    /// Shorthand for [`ApplicationError::FilesystemError`].
    pub fn filesystem(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::FilesystemError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::FileNotFound { path } => vec![
                format!("Expected a file at {}", path.display()),
                "Paths in steps resolve against the current directory".into(),
            ],
            Self::RecipeNotFound { available, .. } => {
                let mut hints = vec!["Try: quill list to see available recipes".into()];
                if !available.is_empty() {
                    hints.push(format!("Available: {}", available.join(", ")));
                }
                hints.push("Add a directory to recipes.paths in the config file".into());
                hints
            }
            Self::CommandNotFound { available, .. } => vec![
                format!("Available commands: {}", available.join(", ")),
                "Try: quill list --format list".into(),
            ],
            Self::RecipeLoad { path, .. } => vec![
                format!("Check the manifest at {}", path.display()),
                "Every recipe needs a [recipe] table and at least one [[commands]] entry".into(),
            ],
            Self::StepFailed { source, .. } => {
                let mut hints = source.suggestions();
                hints.push("Steps before the failing one were already applied".into());
                hints
            }
            Self::ValidationFailed(_) => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. } => ErrorCategory::Internal,
            Self::FileNotFound { .. }
            | Self::RecipeNotFound { .. }
            | Self::CommandNotFound { .. } => ErrorCategory::NotFound,
            Self::RecipeLoad { .. } => ErrorCategory::Configuration,
            Self::StepFailed { source, .. } => source.category(),
            Self::ValidationFailed(_) => ErrorCategory::Validation,
        }
    }
}
