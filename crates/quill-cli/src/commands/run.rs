//! `quill run`: Execute a recipe command in the current directory.

use std::sync::Arc;

use quill_adapters::LocalFilesystem;
use quill_core::application::{GeneratorService, RecipeService};
use tracing::debug;

use crate::{
    cli::{GlobalArgs, OutputFormat, RunArgs},
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
};

pub fn execute(
    args: RunArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let loader = super::recipe_loader(&global, &config);
    debug!(paths = ?loader.search_paths(), "resolving recipe");

    let service = RecipeService::new(Box::new(loader));
    let (recipe, _) = service.command(&args.recipe, &args.command)?;

    let workdir = std::env::current_dir().with_cli_context(|| "Failed to read the current directory")?;
    let generator = GeneratorService::new(Arc::new(LocalFilesystem::new()), workdir);
    let report = generator.run(&recipe, &args.command, &args.args)?;

    if output.format() == OutputFormat::Json {
        output.json(&report)?;
        return Ok(());
    }

    output.success(&format!(
        "{} {}: {} step(s) applied",
        report.recipe, report.command, report.steps
    ))?;
    for path in &report.touched {
        let shown = path.strip_prefix(generator.workdir()).unwrap_or(path);
        output.detail(&format!("  {}", shown.display()))?;
    }

    Ok(())
}
