//! End-to-end tests for the `quill` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const MODEL_RECIPE: &str = r#"
[recipe]
name = "model"
description = "Model with registry entry"

[[commands]]
name = "generate"
description = "Create a model"
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

[[commands.steps]]
action = "sort"
file = "src/models/mod.rs"
select = { consecutive = "pub mod " }
"#;

const TEMPLATE: &str = "pub struct __NaMe__;\n";

/// A recipe directory plus an empty project directory.
struct Fixture {
    recipes: TempDir,
    project: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let recipes = TempDir::new().unwrap();
        let dir = recipes.path().join("model");
        fs::create_dir_all(dir.join("templates")).unwrap();
        fs::write(dir.join("recipe.toml"), MODEL_RECIPE).unwrap();
        fs::write(dir.join("templates/__na_me__.rs"), TEMPLATE).unwrap();

        Self {
            recipes,
            project: TempDir::new().unwrap(),
        }
    }

    fn with_models_mod(self) -> Self {
        let models = self.project.path().join("src/models");
        fs::create_dir_all(&models).unwrap();
        fs::write(models.join("mod.rs"), "pub mod alpha;\npub mod zeta;\n").unwrap();
        self
    }

    fn cmd(&self) -> Command {
        let mut cmd = quill(self.project.path());
        cmd.arg("--recipes").arg(self.recipes.path());
        cmd
    }
}

/// `quill` running in `dir`, isolated from the user's config and env.
fn quill(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("quill").unwrap();
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("HOME", dir)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

// ── help / version ────────────────────────────────────────────────────────────

#[test]
fn help_flag_describes_the_tool() {
    let temp = TempDir::new().unwrap();
    quill(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recipe-driven"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn version_flag_prints_version() {
    let temp = TempDir::new().unwrap();
    quill(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    let temp = TempDir::new().unwrap();
    quill(temp.path()).arg("frobnicate").assert().code(2);
}

// ── casex ─────────────────────────────────────────────────────────────────────

#[test]
fn casex_substitutes_placeholders() {
    let temp = TempDir::new().unwrap();
    quill(temp.path())
        .args(["casex", "__na-me__s", "--name", "userStory"])
        .assert()
        .success()
        .stdout("user-stories\n");

    quill(temp.path())
        .args(["casex", "mod __na_me__;", "-n", "OrderItem"])
        .assert()
        .success()
        .stdout("mod order_item;\n");
}

#[test]
fn casex_rejects_blank_name() {
    let temp = TempDir::new().unwrap();
    quill(temp.path())
        .args(["casex", "__name__", "--name", " "])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--name must not be empty"));
}

// ── list ──────────────────────────────────────────────────────────────────────

#[test]
fn list_shows_recipe_commands() {
    let fixture = Fixture::new();
    fixture
        .cmd()
        .args(["list", "--format", "list"])
        .assert()
        .success()
        .stdout("model generate\n");
}

#[test]
fn list_table_shows_usage() {
    let fixture = Fixture::new();
    fixture
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("model - Model with registry entry"))
        .stdout(predicate::str::contains(
            "usage: quill run model generate <name> [table]",
        ));
}

#[test]
fn list_as_json() {
    let fixture = Fixture::new();
    let assert = fixture
        .cmd()
        .args(["list", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value[0]["name"], "model");
    assert_eq!(value[0]["commands"][0]["name"], "generate");
    assert_eq!(value[0]["commands"][0]["steps"], 3);
}

#[test]
fn list_without_recipes_reports_searched_paths() {
    let temp = TempDir::new().unwrap();
    quill(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No recipes found in"))
        .stdout(predicate::str::contains(".quill/recipes"));
}

#[test]
fn project_local_recipes_are_found() {
    let fixture = Fixture::new();
    let local = fixture.project.path().join(".quill/recipes/model");
    fs::create_dir_all(local.join("templates")).unwrap();
    fs::write(local.join("recipe.toml"), MODEL_RECIPE).unwrap();

    quill(fixture.project.path())
        .args(["list", "--format", "list"])
        .assert()
        .success()
        .stdout("model generate\n");
}

// ── run ───────────────────────────────────────────────────────────────────────

#[test]
fn run_generates_and_registers_model() {
    let fixture = Fixture::new().with_models_mod();

    fixture
        .cmd()
        .args(["run", "model", "generate", "OrderItem"])
        .assert()
        .success()
        .stdout(predicate::str::contains("model generate: 3 step(s) applied"))
        .stdout(predicate::str::contains("order_item.rs"));

    let project = fixture.project.path();
    let model = fs::read_to_string(project.join("src/models/order_item.rs")).unwrap();
    assert_eq!(model.trim_end(), "pub struct OrderItem;");

    let registry = fs::read_to_string(project.join("src/models/mod.rs")).unwrap();
    let registry: Vec<&str> = registry.lines().collect();
    assert_eq!(
        registry,
        ["pub mod alpha;", "pub mod order_item;", "pub mod zeta;"]
    );
}

#[test]
fn run_json_report() {
    let fixture = Fixture::new().with_models_mod();

    let assert = fixture
        .cmd()
        .args(["--output-format", "json", "run", "model", "generate", "OrderItem"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["recipe"], "model");
    assert_eq!(report["command"], "generate");
    assert_eq!(report["steps"], 3);
}

#[test]
fn quiet_run_prints_nothing() {
    let fixture = Fixture::new().with_models_mod();
    fixture
        .cmd()
        .args(["-q", "run", "model", "generate", "OrderItem"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn run_missing_argument_is_a_user_error() {
    let fixture = Fixture::new().with_models_mod();
    fixture
        .cmd()
        .args(["run", "model", "generate"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Missing required argument 'name'"));
}

#[test]
fn run_unknown_recipe_is_not_found() {
    let fixture = Fixture::new();
    fixture
        .cmd()
        .args(["run", "controller", "generate", "Admin"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Recipe 'controller' not found"))
        .stderr(predicate::str::contains("Available: model"));
}

#[test]
fn run_unknown_command_lists_available() {
    let fixture = Fixture::new();
    fixture
        .cmd()
        .args(["run", "model", "destroy"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Available commands: generate"));
}

#[test]
fn failing_step_keeps_earlier_files() {
    // No src/models/mod.rs: the copy succeeds, the insert fails.
    let fixture = Fixture::new();

    fixture
        .cmd()
        .args(["run", "model", "generate", "OrderItem"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Step 2"))
        .stderr(predicate::str::contains("already applied"));

    assert!(
        fixture
            .project
            .path()
            .join("src/models/order_item.rs")
            .exists()
    );
}

// ── render ────────────────────────────────────────────────────────────────────

#[test]
fn render_into_directory_keeps_substituted_filename() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("__na_me__.rs"), TEMPLATE).unwrap();

    quill(temp.path())
        .args(["render", "__na_me__.rs", "out/", "--name", "LineItem"])
        .assert()
        .success()
        .stdout(predicate::str::contains("line_item.rs"));

    let rendered = fs::read_to_string(temp.path().join("out/line_item.rs")).unwrap();
    assert_eq!(rendered.trim_end(), "pub struct LineItem;");
}

#[test]
fn render_missing_source_is_not_found() {
    let temp = TempDir::new().unwrap();
    quill(temp.path())
        .args(["render", "missing.tpl", "out.txt"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("File not found"));
}

// ── config / init ─────────────────────────────────────────────────────────────

#[test]
fn missing_explicit_config_is_a_configuration_error() {
    let temp = TempDir::new().unwrap();
    quill(temp.path())
        .args(["--config", "nope.toml", "list"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn init_local_then_config_get() {
    let temp = TempDir::new().unwrap();

    quill(temp.path())
        .args(["init", "--local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration created"));
    assert!(temp.path().join(".quill.toml").exists());

    quill(temp.path())
        .args(["init", "--local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));

    fs::write(
        temp.path().join(".quill.toml"),
        "[output]\nformat = \"plain\"\n",
    )
    .unwrap();
    quill(temp.path())
        .args(["config", "get", "output.format"])
        .assert()
        .success()
        .stdout("plain\n");
}

#[test]
fn environment_overrides_config_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(".quill.toml"),
        "[output]\nformat = \"plain\"\n",
    )
    .unwrap();

    quill(temp.path())
        .env("QUILL_OUTPUT__FORMAT", "json")
        .args(["config", "get", "output.format"])
        .assert()
        .success()
        .stdout("json\n");
}

#[test]
fn config_get_unknown_key_fails() {
    let temp = TempDir::new().unwrap();
    quill(temp.path())
        .args(["config", "get", "nope"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn log_file_receives_events() {
    let fixture = Fixture::new().with_models_mod();
    let log = fixture.project.path().join("logs/quill.log");

    fixture
        .cmd()
        .arg("-v")
        .arg("--log-file")
        .arg(&log)
        .args(["run", "model", "generate", "OrderItem"])
        .assert()
        .success();

    let content = fs::read_to_string(&log).unwrap();
    assert!(content.contains("created"));
}

// ── completions ───────────────────────────────────────────────────────────────

#[test]
fn completions_bash_names_the_binary() {
    let temp = TempDir::new().unwrap();
    quill(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("quill"));
}
