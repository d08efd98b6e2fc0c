//! Implementation of the `quill list` command.

use quill_core::application::{RecipeInfo, RecipeService};

use crate::{
    cli::{GlobalArgs, ListArgs, ListFormat, OutputFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(
    args: ListArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let loader = super::recipe_loader(&global, &config);
    let searched: Vec<String> = loader
        .search_paths()
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    let service = RecipeService::new(Box::new(loader));
    let recipes = service.list()?;

    // --output-format json wins over the table default.
    let format = if output.format() == OutputFormat::Json {
        ListFormat::Json
    } else {
        args.format
    };

    match format {
        ListFormat::Json => output.json(&recipes)?,
        _ if recipes.is_empty() => {
            output.info(&format!("No recipes found in: {}", searched.join(", ")))?;
        }
        ListFormat::Table => print_table(&recipes, &output)?,
        ListFormat::List => {
            for recipe in &recipes {
                for command in &recipe.commands {
                    output.data(&format!("{} {}", recipe.name, command.name))?;
                }
            }
        }
    }

    Ok(())
}

fn print_table(recipes: &[RecipeInfo], output: &OutputManager) -> CliResult<()> {
    output.header("Available Recipes:")?;
    for recipe in recipes {
        output.data("")?;
        if recipe.description.is_empty() {
            output.data(&format!("  {}", recipe.name))?;
        } else {
            output.data(&format!("  {} - {}", recipe.name, recipe.description))?;
        }
        output.detail(&format!("    {}", recipe.root))?;
        for command in &recipe.commands {
            output.data(&format!(
                "    {:<12} {}",
                command.name, command.description
            ))?;
            output.detail(&format!(
                "                 usage: quill run {} {}",
                recipe.name, command.usage
            ))?;
        }
    }
    Ok(())
}
