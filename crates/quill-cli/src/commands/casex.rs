//! `quill casex`: Print a text with its name placeholders substituted.

use quill_core::domain::casex;

use crate::{
    cli::CasexArgs,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(args: CasexArgs, output: OutputManager) -> CliResult<()> {
    if args.name.trim().is_empty() {
        return Err(CliError::InvalidInput {
            message: "--name must not be empty".into(),
            source: None,
        });
    }

    output.data(&casex(&args.text, &args.name))?;
    Ok(())
}
