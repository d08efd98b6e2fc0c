//! Declarative generators.
//!
//! A recipe is a named set of commands. Each command declares positional
//! arguments and a list of steps that copy template files and edit lines of
//! existing files:
//!
//! ```toml
//! [recipe]
//! name = "model"
//! description = "Model files"
//!
//! [[commands]]
//! name = "generate"
//! args = ["name", "table?"]
//!
//! [[commands.steps]]
//! action = "copy"
//! from = "templates/__na_me__.rs"
//! to = "src/models/"
//!
//! [[commands.steps]]
//! action = "insert"
//! file = "src/models/mod.rs"
//! select = { consecutive = "pub mod " }
//! position = "after"
//! lines = ["pub mod __na_me__;"]
//! ```
//!
//! Step strings are rendered before use: `{{arg}}` is replaced by the bound
//! argument value, then name placeholders are rewritten for the `name`
//! argument (or the first argument when no argument is called `name`).

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::casing::substitute;
use crate::domain::document::{Document, Line, LineCollection, LineOp};
use crate::domain::error::{DomainError, DomainResult};

/// A validated recipe and the directory its template paths resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    name: String,
    description: String,
    commands: Vec<Command>,
    root: PathBuf,
}

impl Recipe {
    /// # Errors
    ///
    /// [`DomainError::InvalidRecipe`] when the recipe has no name or commands,
    /// a command name repeats, or a command is invalid.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        commands: Vec<Command>,
    ) -> DomainResult<Self> {
        let recipe = Self {
            name: name.into(),
            description: description.into(),
            commands,
            root: PathBuf::new(),
        };
        recipe.validate()?;
        Ok(recipe)
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidRecipe("recipe name is empty".into()));
        }
        if self.commands.is_empty() {
            return Err(DomainError::InvalidRecipe(format!(
                "recipe '{}' declares no commands",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for command in &self.commands {
            if !seen.insert(command.name.as_str()) {
                return Err(DomainError::InvalidRecipe(format!(
                    "recipe '{}' declares command '{}' twice",
                    self.name, command.name
                )));
            }
            command.validate()?;
        }
        Ok(())
    }
}

/// One invocable command of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Positional argument names; a trailing `?` marks an optional one.
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A declared positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub optional: bool,
}

impl Parameter {
    fn parse(raw: &str) -> Self {
        match raw.strip_suffix('?') {
            Some(name) => Self {
                name: name.to_string(),
                optional: true,
            },
            None => Self {
                name: raw.to_string(),
                optional: false,
            },
        }
    }
}

impl Command {
    pub fn parameters(&self) -> Vec<Parameter> {
        self.args.iter().map(|a| Parameter::parse(a)).collect()
    }

    /// `generate <name> [table]`
    pub fn usage(&self) -> String {
        let mut usage = self.name.clone();
        for param in self.parameters() {
            if param.optional {
                usage.push_str(&format!(" [{}]", param.name));
            } else {
                usage.push_str(&format!(" <{}>", param.name));
            }
        }
        usage
    }

    /// Bind positional values to the declared arguments.
    ///
    /// Absent optional arguments bind to an empty string.
    ///
    /// # Errors
    ///
    /// - [`DomainError::MissingArgument`] for an absent required argument
    /// - [`DomainError::UnexpectedArgument`] for a surplus value
    pub fn bind<S: AsRef<str>>(&self, values: &[S]) -> DomainResult<Bindings> {
        let params = self.parameters();
        if let Some(extra) = values.get(params.len()) {
            return Err(DomainError::UnexpectedArgument {
                command: self.name.clone(),
                value: extra.as_ref().to_string(),
            });
        }

        let mut bound = BTreeMap::new();
        for (i, param) in params.iter().enumerate() {
            match values.get(i) {
                Some(value) => {
                    bound.insert(param.name.clone(), value.as_ref().to_string());
                }
                None if param.optional => {
                    bound.insert(param.name.clone(), String::new());
                }
                None => {
                    return Err(DomainError::MissingArgument {
                        command: self.name.clone(),
                        argument: param.name.clone(),
                    });
                }
            }
        }

        let name = bound
            .get("name")
            .or_else(|| params.first().and_then(|p| bound.get(&p.name)))
            .filter(|v| !v.is_empty())
            .cloned();

        Ok(Bindings {
            values: bound,
            name,
        })
    }

    fn validate(&self) -> DomainResult<()> {
        let invalid = |msg: String| DomainError::InvalidRecipe(format!("command '{}': {msg}", self.name));

        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidRecipe("command name is empty".into()));
        }
        if self.steps.is_empty() {
            return Err(invalid("no steps".into()));
        }

        let mut optional_seen = false;
        let mut names = HashSet::new();
        for param in self.parameters() {
            if param.name.is_empty() {
                return Err(invalid("empty argument name".into()));
            }
            if !names.insert(param.name.clone()) {
                return Err(invalid(format!("argument '{}' declared twice", param.name)));
            }
            if optional_seen && !param.optional {
                return Err(invalid(format!(
                    "required argument '{}' follows an optional one",
                    param.name
                )));
            }
            optional_seen |= param.optional;
        }

        for step in &self.steps {
            step.validate().map_err(|e| invalid(e.to_string()))?;
        }
        Ok(())
    }
}

/// Argument values bound for one command run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, String>,
    name: Option<String>,
}

impl Bindings {
    pub fn get(&self, argument: &str) -> Option<&str> {
        self.values.get(argument).map(String::as_str)
    }

    /// The value driving name substitution.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Replace `{{arg}}` references only.
    ///
    /// Unknown `{{...}}` references stay as they are.
    pub fn expand(&self, template: &str) -> String {
        let mut result = template.to_string();
        for (key, value) in &self.values {
            let placeholder = format!("{{{{{key}}}}}");
            result = result.replace(&placeholder, value);
        }
        result
    }

    /// Replace `{{arg}}` references, then rewrite name placeholders.
    pub fn render(&self, template: &str) -> String {
        substitute(&self.expand(template), self.name()).into_owned()
    }

    fn render_all(&self, lines: &[String]) -> Vec<String> {
        lines.iter().map(|l| self.render(l)).collect()
    }
}

/// Where inserted lines go relative to the selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Before,
    #[default]
    After,
}

/// How a step picks lines of the target file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Selection {
    /// The first line containing the text.
    Find(String),
    /// The last line containing the text.
    Last(String),
    /// Every line containing the text.
    All(String),
    /// The run of matching lines starting at the first match.
    Consecutive(String),
    /// The lines inside the indentation block opened by the first match.
    Block(String),
}

impl Selection {
    pub fn search(&self) -> &str {
        match self {
            Self::Find(s) | Self::Last(s) | Self::All(s) | Self::Consecutive(s) | Self::Block(s) => s,
        }
    }

    fn rendered(&self, bindings: &Bindings) -> Self {
        let search = bindings.render(self.search());
        match self {
            Self::Find(_) => Self::Find(search),
            Self::Last(_) => Self::Last(search),
            Self::All(_) => Self::All(search),
            Self::Consecutive(_) => Self::Consecutive(search),
            Self::Block(_) => Self::Block(search),
        }
    }

    /// The selected lines. A search without match selects nothing.
    pub fn resolve(&self, doc: &Document) -> DomainResult<LineCollection> {
        let found = |line: Line| {
            if line.is_stub() {
                LineCollection::new()
            } else {
                LineCollection::from(line)
            }
        };

        match self {
            Self::Find(s) => Ok(found(doc.find(s))),
            Self::Last(s) => Ok(found(doc.last(s))),
            Self::All(s) => Ok(doc.all(s)),
            Self::Consecutive(s) => doc.consecutive(s),
            Self::Block(s) => {
                let opening = doc.find(s);
                if opening.is_stub() {
                    return Ok(LineCollection::new());
                }
                let mut block = opening.until_enclosing()?;
                block.dive();
                Ok(block)
            }
        }
    }
}

/// One action of a command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    /// Save a template file to a destination; a destination ending in `/`
    /// keeps the template's file name.
    Copy { from: String, to: String },
    /// Insert lines before or after the selection.
    Insert {
        file: String,
        select: Selection,
        #[serde(default)]
        position: Position,
        lines: Vec<String>,
    },
    Append { file: String, lines: Vec<String> },
    Prepend { file: String, lines: Vec<String> },
    /// Replace text in the first matching line, or every one with `all`.
    Replace {
        file: String,
        search: String,
        with: String,
        #[serde(default)]
        all: bool,
    },
    /// Broadcast a line operation over the selection.
    Edit {
        file: String,
        select: Selection,
        method: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Sort the selected lines in place.
    Sort { file: String, select: Selection },
    Move { from: String, to: String },
    Delete { file: String },
    Chmod { file: String, mode: u32 },
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Copy { .. } => "copy",
            Self::Insert { .. } => "insert",
            Self::Append { .. } => "append",
            Self::Prepend { .. } => "prepend",
            Self::Replace { .. } => "replace",
            Self::Edit { .. } => "edit",
            Self::Sort { .. } => "sort",
            Self::Move { .. } => "move",
            Self::Delete { .. } => "delete",
            Self::Chmod { .. } => "chmod",
        }
    }

    /// The file the step works on.
    pub fn target(&self) -> &str {
        match self {
            Self::Copy { to, .. } | Self::Move { to, .. } => to,
            Self::Insert { file, .. }
            | Self::Append { file, .. }
            | Self::Prepend { file, .. }
            | Self::Replace { file, .. }
            | Self::Edit { file, .. }
            | Self::Sort { file, .. }
            | Self::Delete { file }
            | Self::Chmod { file, .. } => file,
        }
    }

    fn validate(&self) -> DomainResult<()> {
        match self {
            Self::Edit { method, args, .. } => LineOp::parse(method, args.as_slice()).map(|_| ()),
            Self::Insert { lines, .. } | Self::Append { lines, .. } | Self::Prepend { lines, .. }
                if lines.is_empty() =>
            {
                Err(DomainError::InvalidRecipe(format!(
                    "\"{}\" step has no lines",
                    self.action()
                )))
            }
            Self::Chmod { mode, .. } if *mode > 0o7777 => Err(DomainError::InvalidRecipe(
                format!("invalid file mode {mode:o}"),
            )),
            _ => Ok(()),
        }
    }

    /// A copy of the step with every string rendered for `bindings`.
    ///
    /// `edit` arguments are left alone; they are rewritten per line when the
    /// operation is applied. A `copy` source keeps its name placeholders, since
    /// they are part of the template's file name.
    pub fn rendered(&self, bindings: &Bindings) -> Step {
        let r = |s: &String| bindings.render(s);
        match self {
            Self::Copy { from, to } => Self::Copy {
                from: bindings.expand(from),
                to: r(to),
            },
            Self::Insert {
                file,
                select,
                position,
                lines,
            } => Self::Insert {
                file: r(file),
                select: select.rendered(bindings),
                position: *position,
                lines: bindings.render_all(lines),
            },
            Self::Append { file, lines } => Self::Append {
                file: r(file),
                lines: bindings.render_all(lines),
            },
            Self::Prepend { file, lines } => Self::Prepend {
                file: r(file),
                lines: bindings.render_all(lines),
            },
            Self::Replace {
                file,
                search,
                with,
                all,
            } => Self::Replace {
                file: r(file),
                search: r(search),
                with: r(with),
                all: *all,
            },
            Self::Edit {
                file,
                select,
                method,
                args,
            } => Self::Edit {
                file: r(file),
                select: select.rendered(bindings),
                method: method.clone(),
                args: args.clone(),
            },
            Self::Sort { file, select } => Self::Sort {
                file: r(file),
                select: select.rendered(bindings),
            },
            Self::Move { from, to } => Self::Move {
                from: r(from),
                to: r(to),
            },
            Self::Delete { file } => Self::Delete { file: r(file) },
            Self::Chmod { file, mode } => Self::Chmod {
                file: r(file),
                mode: *mode,
            },
        }
    }
}
