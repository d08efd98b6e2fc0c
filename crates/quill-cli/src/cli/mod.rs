//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "quill",
    bin_name = "quill",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Recipe-driven code generation and line-level file editing",
    long_about = "Quill runs declarative recipes that copy name-aware templates \
                  and splice lines into existing source files.",
    after_help = "EXAMPLES:\n\
        \x20 quill list\n\
        \x20 quill run model generate OrderItem order_items\n\
        \x20 quill casex 'struct __NaMe__;' --name order_item\n\
        \x20 quill completions bash > /usr/share/bash-completion/completions/quill",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a recipe command in the current directory.
    #[command(
        visible_alias = "r",
        about = "Run a recipe command",
        after_help = "EXAMPLES:\n\
            \x20 quill run model generate OrderItem\n\
            \x20 quill run model generate OrderItem order_items\n\
            \x20 quill --recipes ./recipes run controller generate admin"
    )]
    Run(RunArgs),

    /// List available recipes.
    #[command(
        visible_alias = "ls",
        about = "List available recipes",
        after_help = "EXAMPLES:\n\
            \x20 quill list\n\
            \x20 quill list --format json"
    )]
    List(ListArgs),

    /// Print a text with its name placeholders substituted.
    #[command(
        about = "Substitute name placeholders in a text",
        after_help = "EXAMPLES:\n\
            \x20 quill casex '__na-me__s' --name userStory     # user-stories\n\
            \x20 quill casex 'mod __na_me__;' --name OrderItem  # mod order_item;"
    )]
    Casex(CasexArgs),

    /// Save a template file to a destination with name substitution.
    #[command(
        about = "Render a template file",
        after_help = "EXAMPLES:\n\
            \x20 quill render templates/__na_me__.rs src/models/ --name OrderItem\n\
            \x20 quill render LICENSE.tpl LICENSE"
    )]
    Render(RenderArgs),

    /// Initialise a Quill configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 quill init           # global config\n\
            \x20 quill init --local   # .quill.toml in the current directory"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 quill completions bash > ~/.local/share/bash-completion/completions/quill\n\
            \x20 quill completions zsh  > ~/.zfunc/_quill\n\
            \x20 quill completions fish > ~/.config/fish/completions/quill.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Quill configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 quill config get recipes.paths\n\
            \x20 quill config list\n\
            \x20 quill config path"
    )]
    Config(ConfigCommands),
}

// ── run ───────────────────────────────────────────────────────────────────────

/// Arguments for `quill run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Recipe name.
    #[arg(value_name = "RECIPE", help = "Recipe name")]
    pub recipe: String,

    /// Command of the recipe.
    #[arg(value_name = "COMMAND", help = "Recipe command")]
    pub command: String,

    /// Positional arguments for the command.
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "Command arguments"
    )]
    pub args: Vec<String>,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `quill list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Recipes with their commands and usage.
    Table,
    /// One `recipe command` pair per line.
    List,
    /// JSON array.
    Json,
}

// ── casex ─────────────────────────────────────────────────────────────────────

/// Arguments for `quill casex`.
#[derive(Debug, Args)]
pub struct CasexArgs {
    /// Text containing name placeholders.
    #[arg(value_name = "TEXT", help = "Text with placeholders like __na-me__")]
    pub text: String,

    /// Name to substitute, in any casing.
    #[arg(short = 'n', long = "name", value_name = "NAME", help = "Name to substitute")]
    pub name: String,
}

// ── render ────────────────────────────────────────────────────────────────────

/// Arguments for `quill render`.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Template file.
    #[arg(value_name = "SOURCE", help = "Template file")]
    pub source: PathBuf,

    /// Destination; a trailing `/` keeps the template's file name.
    #[arg(value_name = "DEST", help = "Destination file or directory/")]
    pub destination: PathBuf,

    /// Name to substitute in the destination path and the content.
    #[arg(short = 'n', long = "name", value_name = "NAME", help = "Name to substitute")]
    pub name: Option<String>,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `quill init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `.quill.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `quill completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `quill config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `output.format`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
