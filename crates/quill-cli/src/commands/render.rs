//! `quill render`: Save a template file to a destination with substitution.

use std::sync::Arc;

use quill_adapters::LocalFilesystem;
use quill_core::application::{ApplicationError, File};
use tracing::instrument;

use crate::{
    cli::{OutputFormat, RenderArgs},
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(source = %args.source.display()))]
pub fn execute(args: RenderArgs, output: OutputManager) -> CliResult<()> {
    let source = File::new(Arc::new(LocalFilesystem::new()), &args.source, None);
    if !source.exists() {
        return Err(CliError::Core(
            ApplicationError::FileNotFound {
                path: source.path().to_path_buf(),
            }
            .into(),
        ));
    }

    let rendered = source.save_as(&args.destination, args.name.as_deref())?;

    if output.format() == OutputFormat::Json {
        output.json(&serde_json::json!({ "path": rendered.path() }))?;
    } else {
        output.success(&format!("Rendered {}", rendered.path().display()))?;
    }
    Ok(())
}
