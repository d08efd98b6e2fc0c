//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "run a recipe command" or "list recipes".

pub mod generator_service;
pub mod recipe_service;

pub use generator_service::{GeneratorService, RunReport};
pub use recipe_service::{CommandInfo, RecipeInfo, RecipeService};
