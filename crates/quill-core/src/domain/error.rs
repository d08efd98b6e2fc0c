// ============================================================================
// domain/error.rs - DOCUMENT AND RECIPE ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (collections apply an operation to many lines)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Structural Violations
    // ========================================================================
    #[error("Attempting to call \"{operation}\" on the {boundary} line of the document")]
    Boundary {
        operation: &'static str,
        boundary: Boundary,
    },

    #[error("Unable to find an enclosing line that matches the indentation {indentation:?}")]
    NoEnclosingLine { indentation: String },

    #[error("Line is not part of its document anymore (called \"{operation}\")")]
    DetachedLine { operation: &'static str },

    #[error("Line belongs to a different document")]
    ForeignLine,

    #[error("Index {index} is out of bounds for a document of {len} lines")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Cannot call \"{operation}\" on an empty line collection")]
    EmptyCollection { operation: &'static str },

    #[error("Search stub has no position")]
    StubLine,

    // ========================================================================
    // Content Misuse
    // ========================================================================
    #[error("Attempting to treat binary file as text: {path}")]
    BinaryContent { path: String },

    // ========================================================================
    // Dynamic Dispatch
    // ========================================================================
    #[error("Method {name} does not exist in Line")]
    UnknownMethod { name: String },

    #[error("Method {method} expects {expected} argument(s), got {got}")]
    InvalidArguments {
        method: String,
        expected: String,
        got: usize,
    },

    // ========================================================================
    // Recipe Validation
    // ========================================================================
    #[error("Invalid recipe: {0}")]
    InvalidRecipe(String),

    #[error("Missing required argument '{argument}' for command '{command}'")]
    MissingArgument { command: String, argument: String },

    #[error("Unexpected argument '{value}' for command '{command}'")]
    UnexpectedArgument { command: String, value: String },
}

/// Which end of the document an operation ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    First,
    Last,
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::Last => write!(f, "last"),
        }
    }
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Boundary { operation, boundary } => vec![
                format!("\"{}\" has no {} neighbour to work with", operation, boundary),
                "Check is_first()/is_last() before navigating".into(),
            ],
            Self::NoEnclosingLine { .. } => vec![
                "The block opened by this line is never closed".into(),
                "Check the indentation of the target file".into(),
            ],
            Self::BinaryContent { path } => vec![
                format!("'{}' looks like a binary file", path),
                "Binary files can only be copied, moved or deleted".into(),
            ],
            Self::UnknownMethod { name } => vec![
                format!("'{}' is not a line operation", name),
                "Available: name, replace, prepend, append, left-pad, right-pad, left-unpad, right-unpad, indent, replace-indentation, remove".into(),
            ],
            Self::InvalidRecipe(msg) => vec![
                "Check the recipe manifest".into(),
                format!("Details: {}", msg),
            ],
            Self::MissingArgument { command, .. } => vec![
                format!("'{}' needs more positional arguments", command),
                "Try: quill list to see the arguments of each command".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Boundary { .. }
            | Self::NoEnclosingLine { .. }
            | Self::DetachedLine { .. }
            | Self::ForeignLine
            | Self::IndexOutOfBounds { .. }
            | Self::EmptyCollection { .. }
            | Self::StubLine => ErrorCategory::Structure,
            Self::BinaryContent { .. } => ErrorCategory::Validation,
            Self::UnknownMethod { .. }
            | Self::InvalidArguments { .. }
            | Self::InvalidRecipe(_)
            | Self::MissingArgument { .. }
            | Self::UnexpectedArgument { .. } => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Structure,
}

/// Result alias used throughout the document model.
pub type DomainResult<T> = Result<T, DomainError>;
