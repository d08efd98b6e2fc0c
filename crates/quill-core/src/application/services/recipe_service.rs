//! Recipe Service - recipe discovery and lookup.

use serde::Serialize;

use crate::{
    application::{ApplicationError, ports::RecipeSource},
    domain::{Command, Recipe},
    error::QuillResult,
};

/// Recipe metadata for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeInfo {
    pub name: String,
    pub description: String,
    pub root: String,
    pub commands: Vec<CommandInfo>,
}

/// Command metadata for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandInfo {
    pub name: String,
    pub description: String,
    pub usage: String,
    pub steps: usize,
}

impl From<&Recipe> for RecipeInfo {
    fn from(recipe: &Recipe) -> Self {
        Self {
            name: recipe.name().to_string(),
            description: recipe.description().to_string(),
            root: recipe.root().display().to_string(),
            commands: recipe
                .commands()
                .iter()
                .map(|c| CommandInfo {
                    name: c.name.clone(),
                    description: c.description.clone(),
                    usage: c.usage(),
                    steps: c.steps.len(),
                })
                .collect(),
        }
    }
}

/// Service for recipe queries.
pub struct RecipeService {
    source: Box<dyn RecipeSource>,
}

impl RecipeService {
    pub fn new(source: Box<dyn RecipeSource>) -> Self {
        Self { source }
    }

    /// All recipes, for display.
    pub fn list(&self) -> QuillResult<Vec<RecipeInfo>> {
        Ok(self.source.list()?.iter().map(RecipeInfo::from).collect())
    }

    /// A recipe by name.
    pub fn get(&self, name: &str) -> QuillResult<Recipe> {
        let recipes = self.source.list()?;
        let available: Vec<String> = recipes.iter().map(|r| r.name().to_string()).collect();
        recipes
            .into_iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| {
                ApplicationError::RecipeNotFound {
                    name: name.to_string(),
                    available,
                }
                .into()
            })
    }

    /// A recipe and one of its commands.
    ///
    /// # Errors
    ///
    /// [`ApplicationError::RecipeNotFound`] or [`ApplicationError::CommandNotFound`].
    pub fn command(&self, recipe: &str, command: &str) -> QuillResult<(Recipe, Command)> {
        let recipe = self.get(recipe)?;
        match recipe.command(command) {
            Some(found) => {
                let found = found.clone();
                Ok((recipe, found))
            }
            None => Err(ApplicationError::CommandNotFound {
                recipe: recipe.name().to_string(),
                command: command.to_string(),
                available: recipe.commands().iter().map(|c| c.name.clone()).collect(),
            }
            .into()),
        }
    }
}
