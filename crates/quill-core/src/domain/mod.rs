// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for quill.
//!
//! Pure logic over in-memory text: no filesystem, no terminal. Reading and
//! writing files goes through the ports of the application layer.
//!
//! - [`casing`]: name placeholder substitution (`__na-me__` → `foo-bar`)
//! - [`text`]: line splitting, indentation and binary sniffing
//! - [`encoding`]: lossless decoding of UTF-8 and legacy encodings
//! - [`document`]: line-addressable documents, lines and line collections
//! - [`recipe`]: declarative generator definitions

pub mod casing;
pub mod document;
pub mod encoding;
pub mod error;
pub mod recipe;
pub mod text;

pub use casing::{casex, substitute};
pub use document::{
    Document, Line, LineCollection, LineMatcher, LineOp, LineTarget, NewLine, SearchOptions,
    Snippet, UntilTarget,
};
pub use encoding::TextEncoding;
pub use error::{Boundary, DomainError, DomainResult, ErrorCategory};
pub use recipe::{Bindings, Command, Parameter, Position, Recipe, Selection, Step};
