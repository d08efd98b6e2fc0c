//! Generator Service - runs recipe commands.
//!
//! A run binds the command arguments, then executes the steps in order:
//! 1. Render the step strings for the bound arguments
//! 2. Open the target file through the filesystem port
//! 3. Select lines and edit the document
//! 4. Save
//!
//! There is no rollback: a failing step aborts the run and the steps before
//! it stay applied.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::application::file::{File, resolve_path};
use crate::application::{ApplicationError, ports::Filesystem};
use crate::domain::{Position, Recipe, Step};
use crate::error::QuillResult;

/// What a finished run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub recipe: String,
    pub command: String,
    pub steps: usize,
    /// Files written, moved, deleted or changed, in step order.
    pub touched: Vec<PathBuf>,
}

/// Executes recipe commands against a working directory.
pub struct GeneratorService {
    filesystem: Arc<dyn Filesystem>,
    workdir: PathBuf,
}

impl GeneratorService {
    /// Create a generator writing relative paths under `workdir`.
    pub fn new(filesystem: Arc<dyn Filesystem>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            filesystem,
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run `command` of `recipe` with positional `args`.
    ///
    /// # Errors
    ///
    /// - `DomainError::MissingArgument` / `UnexpectedArgument` before any step runs
    /// - [`ApplicationError::CommandNotFound`] for an unknown command
    /// - [`ApplicationError::StepFailed`] wrapping the first failing step
    #[instrument(skip(self, recipe, args), fields(recipe = %recipe.name()))]
    pub fn run<S: AsRef<str>>(
        &self,
        recipe: &Recipe,
        command: &str,
        args: &[S],
    ) -> QuillResult<RunReport> {
        let cmd = recipe.command(command).ok_or_else(|| ApplicationError::CommandNotFound {
            recipe: recipe.name().to_string(),
            command: command.to_string(),
            available: recipe.commands().iter().map(|c| c.name.clone()).collect(),
        })?;
        let bindings = cmd.bind(args)?;

        info!(
            command,
            name = bindings.name().unwrap_or_default(),
            steps = cmd.steps.len(),
            "Running recipe command"
        );

        let mut report = RunReport {
            recipe: recipe.name().to_string(),
            command: command.to_string(),
            ..RunReport::default()
        };

        for (i, step) in cmd.steps.iter().enumerate() {
            let step = step.rendered(&bindings);
            debug!(index = i + 1, action = step.action(), target = step.target(), "Executing step");

            let touched = self
                .execute(recipe, &step, bindings.name())
                .map_err(|e| ApplicationError::StepFailed {
                    index: i + 1,
                    action: step.action(),
                    target: step.target().to_string(),
                    source: Box::new(e),
                })?;

            report.steps += 1;
            report.touched.extend(touched);
        }

        info!(steps = report.steps, "Recipe command completed");
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn in_workdir(&self, path: &str) -> PathBuf {
        self.workdir.join(resolve_path(path, None))
    }

    fn in_recipe(&self, recipe: &Recipe, path: &str) -> PathBuf {
        recipe.root().join(resolve_path(path, None))
    }

    fn open(&self, path: &Path) -> File {
        File::new(self.filesystem.clone(), path, None)
    }

    fn open_existing(&self, path: &Path) -> QuillResult<File> {
        let file = self.open(path);
        if !file.exists() {
            return Err(ApplicationError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }
        Ok(file)
    }

    fn execute(&self, recipe: &Recipe, step: &Step, name: Option<&str>) -> QuillResult<Vec<PathBuf>> {
        match step {
            Step::Copy { from, to } => {
                let template = self.open_existing(&self.in_recipe(recipe, from))?;
                let saved = template.save_as(self.in_workdir(to), name)?;
                Ok(vec![saved.path().to_path_buf()])
            }
            Step::Insert {
                file,
                select,
                position,
                lines,
            } => {
                let file = self.open_existing(&self.in_workdir(file))?;
                let doc = file.document()?;
                let selection = select.resolve(&doc)?;

                let anchor = match position {
                    Position::Before => selection.first(),
                    Position::After => selection.last(),
                };
                let Some(anchor) = anchor else {
                    warn!(search = select.search(), file = %file.path().display(), "Selection matched nothing, skipping insert");
                    return Ok(Vec::new());
                };
                match position {
                    Position::Before => anchor.before(lines)?,
                    Position::After => anchor.after(lines)?,
                };
                Ok(vec![file.save()?.path().to_path_buf()])
            }
            Step::Append { file, lines } | Step::Prepend { file, lines } => {
                let file = self.open(&self.in_workdir(file));
                if file.is_empty()? {
                    file.set_text(&lines.join("\n"))?;
                } else if matches!(step, Step::Append { .. }) {
                    file.document()?.append(lines)?;
                } else {
                    file.document()?.prepend(lines)?;
                }
                Ok(vec![file.save()?.path().to_path_buf()])
            }
            Step::Replace {
                file,
                search,
                with,
                all,
            } => {
                let file = self.open_existing(&self.in_workdir(file))?;
                let doc = file.document()?;
                if *all {
                    doc.replace_all(search, with);
                } else {
                    doc.replace(search, with);
                }
                Ok(vec![file.save()?.path().to_path_buf()])
            }
            Step::Edit {
                file,
                select,
                method,
                args,
            } => {
                let file = self.open_existing(&self.in_workdir(file))?;
                let selection = select.resolve(&file.document()?)?;
                if selection.is_empty() {
                    warn!(search = select.search(), file = %file.path().display(), "Selection matched nothing, skipping edit");
                    return Ok(Vec::new());
                }
                selection.invoke(method, args, name)?;
                Ok(vec![file.save()?.path().to_path_buf()])
            }
            Step::Sort { file, select } => {
                let file = self.open_existing(&self.in_workdir(file))?;
                let mut selection = select.resolve(&file.document()?)?;
                selection.sort()?;
                Ok(vec![file.save()?.path().to_path_buf()])
            }
            Step::Move { from, to } => {
                let source = self.open_existing(&self.in_workdir(from))?;
                let moved = source.move_to(self.in_workdir(to), name)?;
                Ok(vec![source.path().to_path_buf(), moved.path().to_path_buf()])
            }
            Step::Delete { file } => {
                let file = self.open(&self.in_workdir(file));
                file.delete()?;
                Ok(vec![file.path().to_path_buf()])
            }
            Step::Chmod { file, mode } => {
                let file = self.open_existing(&self.in_workdir(file))?;
                file.chmod(*mode)?;
                Ok(vec![file.path().to_path_buf()])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockFilesystem;
    use crate::domain::{Command, DomainError, Selection};
    use crate::error::QuillError;

    fn recipe(steps: Vec<Step>) -> Recipe {
        Recipe::new(
            "model",
            "",
            vec![Command {
                name: "generate".into(),
                description: String::new(),
                args: vec!["name".into()],
                steps,
            }],
        )
        .unwrap()
    }

    #[test]
    fn missing_argument_fails_before_touching_files() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().never();
        fs.expect_write().never();

        let service = GeneratorService::new(Arc::new(fs), "/work");
        let recipe = recipe(vec![Step::Delete {
            file: "x".into(),
        }]);
        let none: &[&str] = &[];

        let err = service.run(&recipe, "generate", none).unwrap_err();
        assert!(matches!(
            err,
            QuillError::Domain(DomainError::MissingArgument { .. })
        ));
    }

    #[test]
    fn unknown_command_lists_available_ones() {
        let service = GeneratorService::new(Arc::new(MockFilesystem::new()), "/work");
        let err = service
            .run(&recipe(vec![Step::Delete { file: "x".into() }]), "destroy", &["a"])
            .unwrap_err();

        match err {
            QuillError::Application(ApplicationError::CommandNotFound { available, .. }) => {
                assert_eq!(available, ["generate"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failing_step_is_reported_with_its_index() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(false);

        let service = GeneratorService::new(Arc::new(fs), "/work");
        let recipe = recipe(vec![Step::Insert {
            file: "src/__na_me__.rs".into(),
            select: Selection::Find("mod".into()),
            position: Position::After,
            lines: vec!["x".into()],
        }]);

        let err = service.run(&recipe, "generate", &["OrderItem"]).unwrap_err();
        match err {
            QuillError::Application(ApplicationError::StepFailed {
                index,
                action,
                target,
                source,
            }) => {
                assert_eq!(index, 1);
                assert_eq!(action, "insert");
                assert_eq!(target, "src/order_item.rs");
                assert!(matches!(
                    *source,
                    QuillError::Application(ApplicationError::FileNotFound { .. })
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
