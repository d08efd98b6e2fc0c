//! Filesystem-based recipe loader.
//!
//! Discovers and parses `recipe.toml` manifests from one or more search
//! directories, converting them into domain [`Recipe`] objects.
//!
//! # Directory layout expected
//!
//! ```text
//! recipes/
//! ├── model/
//! │   ├── recipe.toml          ← manifest (required)
//! │   └── templates/
//! │       └── __na_me__.rs     ← referenced by `copy` steps
//! └── controller/
//!     └── recipe.toml
//! ```
//!
//! # `recipe.toml` format
//!
//! ```toml
//! [recipe]
//! name        = "model"        # optional; defaults to the directory name
//! description = "Model files"  # optional
//!
//! [[commands]]
//! name = "generate"
//! args = ["name", "table?"]
//!
//! [[commands.steps]]
//! action = "copy"
//! from   = "templates/__na_me__.rs"
//! to     = "src/models/"
//! ```

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use quill_core::{
    application::{ApplicationError, ports::RecipeSource},
    domain::{Command, Recipe},
    error::QuillResult,
};

/// File name of a recipe manifest inside its directory.
pub const MANIFEST_FILE: &str = "recipe.toml";

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of a `recipe.toml` file.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RecipeManifest {
    pub recipe: RecipeSection,
    #[serde(default)]
    pub commands: Vec<Command>,
}

/// `[recipe]` section.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RecipeSection {
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads [`Recipe`] objects from directories of `recipe.toml` manifests.
///
/// Each immediate subdirectory of a search directory that contains a valid
/// manifest is one recipe. Subdirectories without a manifest, or whose
/// manifest is invalid, emit a `WARN` log and are skipped. When two search
/// directories hold a recipe of the same name, the earlier directory wins.
///
/// # Example
///
/// ```no_run
/// use quill_adapters::RecipeLoader;
///
/// let loader = RecipeLoader::new(["./.quill/recipes"]);
/// let recipes = loader.load_all()?;
/// println!("Loaded {} recipes", recipes.len());
/// # Ok::<(), quill_core::error::QuillError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RecipeLoader {
    search_paths: Vec<PathBuf>,
}

impl RecipeLoader {
    /// Create a loader over `search_paths`, in precedence order.
    ///
    /// Directories that do not exist are skipped when loading.
    pub fn new<I, P>(search_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Load every valid recipe, sorted by name.
    ///
    /// # Errors
    ///
    /// [`ApplicationError::RecipeLoad`] when an existing search directory
    /// cannot be walked.
    #[instrument(skip(self), fields(paths = self.search_paths.len()))]
    pub fn load_all(&self) -> QuillResult<Vec<Recipe>> {
        let mut recipes: Vec<Recipe> = Vec::new();
        let mut seen = HashSet::new();

        for search_path in &self.search_paths {
            if !search_path.is_dir() {
                debug!(dir = %search_path.display(), "recipe directory not found, skipping");
                continue;
            }

            for entry in WalkDir::new(search_path)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry.map_err(|e| ApplicationError::RecipeLoad {
                    path: search_path.clone(),
                    reason: format!("directory walk error: {e}"),
                })?;
                if !entry.file_type().is_dir() {
                    continue; // Only process subdirectories.
                }

                let dir = entry.path();
                match self.load_recipe(dir) {
                    Ok(recipe) => {
                        if !seen.insert(recipe.name().to_string()) {
                            warn!(
                                name = recipe.name(),
                                dir = %dir.display(),
                                "recipe shadowed by an earlier search path"
                            );
                            continue;
                        }
                        debug!(name = recipe.name(), commands = recipe.commands().len(), "loaded recipe");
                        recipes.push(recipe);
                    }
                    Err(e) => {
                        // One bad recipe must not block all others.
                        warn!(
                            dir   = %dir.display(),
                            error = %e,
                            "skipping recipe directory due to load error"
                        );
                    }
                }
            }
        }

        recipes.sort_by(|a, b| a.name().cmp(b.name()));
        debug!(count = recipes.len(), "finished loading recipes");
        Ok(recipes)
    }

    /// Load a single recipe from its directory.
    ///
    /// # Errors
    ///
    /// [`ApplicationError::RecipeLoad`] when the manifest is missing or
    /// unparseable, or the recipe it describes is invalid.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn load_recipe(&self, dir: &Path) -> QuillResult<Recipe> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let load_error = |reason: String| ApplicationError::RecipeLoad {
            path: manifest_path.clone(),
            reason,
        };

        if !manifest_path.is_file() {
            return Err(load_error(format!("missing {MANIFEST_FILE}")).into());
        }

        let raw = fs::read_to_string(&manifest_path).map_err(|e| load_error(e.to_string()))?;
        let manifest: RecipeManifest =
            toml::from_str(&raw).map_err(|e| load_error(e.to_string()))?;

        let name = manifest.recipe.name.unwrap_or_else(|| {
            dir.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        let recipe = Recipe::new(name, manifest.recipe.description, manifest.commands)
            .map_err(|e| load_error(e.to_string()))?;
        Ok(recipe.with_root(dir))
    }
}

impl RecipeSource for RecipeLoader {
    fn list(&self) -> QuillResult<Vec<Recipe>> {
        self.load_all()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::{Selection, Step};
    use quill_core::error::QuillError;
    use tempfile::TempDir;

    const MODEL_MANIFEST: &str = r#"
[recipe]
description = "Model files"

[[commands]]
name = "generate"
args = ["name", "table?"]

[[commands.steps]]
action = "copy"
from = "templates/__na_me__.rs"
to = "src/models/"

[[commands.steps]]
action = "insert"
file = "src/models/mod.rs"
select = { consecutive = "pub mod " }
lines = ["pub mod __na_me__;"]
"#;

    fn write_recipe(root: &Path, dir: &str, manifest: &str) -> PathBuf {
        let dir = root.join(dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
        dir
    }

    #[test]
    fn missing_search_paths_are_skipped() {
        let loader = RecipeLoader::new(["/absolutely/does/not/exist"]);
        assert!(loader.load_all().unwrap().is_empty());
    }

    #[test]
    fn loads_recipe_named_after_its_directory() {
        let temp = TempDir::new().unwrap();
        let dir = write_recipe(temp.path(), "model", MODEL_MANIFEST);

        let recipes = RecipeLoader::new([temp.path()]).load_all().unwrap();

        assert_eq!(recipes.len(), 1);
        let recipe = &recipes[0];
        assert_eq!(recipe.name(), "model");
        assert_eq!(recipe.description(), "Model files");
        assert_eq!(recipe.root(), dir);

        let command = recipe.command("generate").unwrap();
        assert_eq!(command.usage(), "generate <name> [table]");
        assert!(matches!(
            &command.steps[1],
            Step::Insert { select: Selection::Consecutive(s), .. } if s == "pub mod "
        ));
    }

    #[test]
    fn skips_files_and_invalid_recipes() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README.md"), "# recipes").unwrap();
        fs::create_dir(temp.path().join("empty")).unwrap();
        write_recipe(temp.path(), "broken", "[recipe]\nname = ");
        write_recipe(temp.path(), "no-commands", "[recipe]\nname = \"x\"\n");
        write_recipe(temp.path(), "model", MODEL_MANIFEST);

        let recipes = RecipeLoader::new([temp.path()]).load_all().unwrap();

        let names: Vec<_> = recipes.iter().map(|r| r.name()).collect();
        assert_eq!(names, ["model"]);
    }

    #[test]
    fn earlier_search_path_wins() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        write_recipe(project.path(), "model", MODEL_MANIFEST);
        write_recipe(
            user.path(),
            "model",
            &MODEL_MANIFEST.replace("Model files", "User model"),
        );
        write_recipe(
            user.path(),
            "alpha",
            &MODEL_MANIFEST.replace("Model files", "Alpha"),
        );

        let recipes = RecipeLoader::new([project.path(), user.path()])
            .load_all()
            .unwrap();

        let described: Vec<_> = recipes
            .iter()
            .map(|r| (r.name(), r.description()))
            .collect();
        assert_eq!(described, [("alpha", "Alpha"), ("model", "Model files")]);
    }

    #[test]
    fn load_recipe_reports_unknown_actions() {
        let temp = TempDir::new().unwrap();
        let dir = write_recipe(
            temp.path(),
            "bad",
            "[recipe]\n[[commands]]\nname = \"go\"\n[[commands.steps]]\naction = \"explode\"\n",
        );

        let err = RecipeLoader::new([temp.path()]).load_recipe(&dir).unwrap_err();

        match err {
            QuillError::Application(ApplicationError::RecipeLoad { path, reason }) => {
                assert!(path.ends_with(MANIFEST_FILE));
                assert!(reason.contains("explode"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn source_lists_loaded_recipes() {
        let temp = TempDir::new().unwrap();
        write_recipe(temp.path(), "model", MODEL_MANIFEST);

        let source: Box<dyn RecipeSource> = Box::new(RecipeLoader::new([temp.path()]));

        assert_eq!(source.list().unwrap().len(), 1);
    }
}
