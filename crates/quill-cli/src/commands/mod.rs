//! Command handlers, one module per subcommand.

use std::path::PathBuf;

use quill_adapters::RecipeLoader;

use crate::{cli::GlobalArgs, config::AppConfig};

pub mod casex;
pub mod completions;
pub mod config;
pub mod init;
pub mod list;
pub mod render;
pub mod run;

/// Recipe search paths: `--recipes` flags first, then `recipes.paths`.
pub(crate) fn search_paths(global: &GlobalArgs, config: &AppConfig) -> Vec<PathBuf> {
    global
        .recipes
        .iter()
        .chain(config.recipes.paths.iter())
        .cloned()
        .collect()
}

pub(crate) fn recipe_loader(global: &GlobalArgs, config: &AppConfig) -> RecipeLoader {
    RecipeLoader::new(search_paths(global, config))
}
