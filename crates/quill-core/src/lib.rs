//! Quill Core - line-addressable documents and recipe-driven generators.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            quill-cli (CLI)              │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │   (GeneratorService, RecipeService)     │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │      (Filesystem, RecipeSource)         │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     quill-adapters (Infrastructure)     │
//! │ (LocalFilesystem, MemoryFilesystem,     │
//! │  RecipeLoader)                          │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ (Document, Line, LineCollection, casex, │
//! │  Recipe)                                │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use quill_core::domain::Document;
//!
//! let doc = Document::from_text("mod a;\nmod c;\n\nfn main() {}");
//! doc.find("mod a;").after(["mod b;"]).unwrap();
//! assert_eq!(doc.consecutive("mod ").unwrap().text_array(), ["mod a;", "mod b;", "mod c;"]);
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quill_core::application::GeneratorService;
//!
//! // Recipes come from a `RecipeSource`, files go through a `Filesystem`.
//! let service = GeneratorService::new(Arc::new(filesystem), ".");
//! service.run(&recipe, "generate", &["OrderItem"]).unwrap();
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        File, GeneratorService, RecipeInfo, RecipeService, RunReport,
        ports::{Filesystem, RecipeSource},
    };
    pub use crate::domain::{
        Command, Document, Line, LineCollection, Recipe, Selection, Step, casex, substitute,
    };
    pub use crate::error::{QuillError, QuillResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
