//! End-to-end recipe runs against the in-memory and local filesystems.

use std::path::Path;
use std::sync::Arc;

use quill_adapters::{LocalFilesystem, MemoryFilesystem, RecipeLoader};
use quill_core::application::{ApplicationError, File, GeneratorService, RecipeService};
use quill_core::domain::{DomainError, Recipe};
use quill_core::error::QuillError;
use tempfile::TempDir;

const MODEL_RECIPE: &str = r#"
[recipe]
name = "model"
description = "Model with registry entry"

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

[[commands.steps]]
action = "sort"
file = "src/models/mod.rs"
select = { consecutive = "pub mod " }

[[commands.steps]]
action = "insert"
file = "src/models/mod.rs"
select = { block = "vec![" }
position = "after"
lines = ["        \"{{table}}\","]

[[commands.steps]]
action = "edit"
file = "src/models/mod.rs"
select = { block = "vec![" }
method = "right-unpad"
args = [","]
"#;

const TEMPLATE: &str = "pub struct __NaMe__;\n\nimpl __NaMe__ {\n    pub const KEY: &str = \"__na-me__\";\n}";

const MODELS_MOD: &str = "pub mod alpha;\npub mod zeta;\n\npub fn tables() -> Vec<&'static str> {\n    vec![\n        \"alphas\",\n    ]\n}";

fn model_recipe() -> Recipe {
    let manifest: toml::Table = toml::from_str(MODEL_RECIPE).unwrap();
    let commands = manifest["commands"].clone().try_into().unwrap();
    Recipe::new("model", "Model with registry entry", commands)
        .unwrap()
        .with_root("/recipes/model")
}

fn memory_project() -> MemoryFilesystem {
    MemoryFilesystem::new()
        .with_file("/recipes/model/templates/__na_me__.rs", TEMPLATE)
        .with_file("/work/src/models/mod.rs", MODELS_MOD)
}

fn lines(fs: &MemoryFilesystem, path: &str) -> Vec<String> {
    fs.read_file(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn generate_model_in_memory() {
    let fs = memory_project();
    let service = GeneratorService::new(Arc::new(fs.clone()), "/work");

    let report = service
        .run(&model_recipe(), "generate", &["OrderItem", "order_items"])
        .unwrap();

    assert_eq!(report.steps, 5);
    assert_eq!(
        report.touched.first().map(|p| p.as_path()),
        Some(Path::new("/work/src/models/order_item.rs"))
    );

    assert_eq!(
        lines(&fs, "/work/src/models/order_item.rs"),
        [
            "pub struct OrderItem;",
            "",
            "impl OrderItem {",
            "    pub const KEY: &str = \"order-item\";",
            "}",
        ]
    );
    assert_eq!(
        lines(&fs, "/work/src/models/mod.rs"),
        [
            "pub mod alpha;",
            "pub mod order_item;",
            "pub mod zeta;",
            "",
            "pub fn tables() -> Vec<&'static str> {",
            "    vec![",
            "        \"alphas\"",
            "        \"order_items\"",
            "    ]",
            "}",
        ]
    );
}

#[test]
fn failing_step_keeps_earlier_changes() {
    let fs = MemoryFilesystem::new().with_file("/recipes/model/templates/__na_me__.rs", TEMPLATE);
    let service = GeneratorService::new(Arc::new(fs.clone()), "/work");

    let err = service
        .run(&model_recipe(), "generate", &["OrderItem"])
        .unwrap_err();

    match &err {
        QuillError::Application(ApplicationError::StepFailed { index, target, .. }) => {
            assert_eq!(*index, 2);
            assert_eq!(target, "src/models/mod.rs");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(fs.read_file("/work/src/models/order_item.rs").is_some());
}

#[test]
fn surplus_arguments_are_rejected() {
    let service = GeneratorService::new(Arc::new(memory_project()), "/work");

    let err = service
        .run(&model_recipe(), "generate", &["a", "b", "c"])
        .unwrap_err();

    assert!(matches!(
        err.domain(),
        Some(DomainError::UnexpectedArgument { value, .. }) if value == "c"
    ));
}

#[test]
fn file_lifecycle_steps() {
    let recipe_toml = r#"
[[commands]]
name = "rename"
args = ["name"]

[[commands.steps]]
action = "move"
from = "bin/tool.sh"
to = "bin/__na-me__.sh"

[[commands.steps]]
action = "chmod"
file = "bin/__na-me__.sh"
mode = 0o755

[[commands.steps]]
action = "append"
file = "NOTES.md"
lines = ["renamed tool to __na-me__"]

[[commands.steps]]
action = "replace"
file = "bin/__na-me__.sh"
search = "tool"
with = "__na_me__"
all = true

[[commands.steps]]
action = "delete"
file = "bin/obsolete"
"#;
    let manifest: toml::Table = toml::from_str(recipe_toml).unwrap();
    let recipe = Recipe::new("tools", "", manifest["commands"].clone().try_into().unwrap()).unwrap();

    let fs = MemoryFilesystem::new()
        .with_file("/work/bin/tool.sh", "#!/bin/sh\necho tool\necho tool again")
        .with_file("/work/bin/obsolete", "x");
    let service = GeneratorService::new(Arc::new(fs.clone()), "/work");

    service.run(&recipe, "rename", &["dataSync"]).unwrap();

    assert!(fs.read_file("/work/bin/tool.sh").is_none());
    assert!(fs.read_file("/work/bin/obsolete").is_none());
    assert_eq!(fs.mode("/work/bin/data-sync.sh"), Some(0o755));
    assert_eq!(
        lines(&fs, "/work/bin/data-sync.sh"),
        ["#!/bin/sh", "echo data_sync", "echo data_sync again"]
    );
    assert_eq!(lines(&fs, "/work/NOTES.md"), ["renamed tool to data-sync"]);
}

#[test]
fn recipes_from_disk_run_against_local_files() {
    let recipes = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    let recipe_dir = recipes.path().join("model");
    std::fs::create_dir_all(recipe_dir.join("templates")).unwrap();
    std::fs::write(recipe_dir.join("recipe.toml"), MODEL_RECIPE).unwrap();
    std::fs::write(recipe_dir.join("templates/__na_me__.rs"), TEMPLATE).unwrap();

    std::fs::create_dir_all(project.path().join("src/models")).unwrap();
    std::fs::write(project.path().join("src/models/mod.rs"), MODELS_MOD).unwrap();

    let recipe_service = RecipeService::new(Box::new(RecipeLoader::new([recipes.path()])));
    let (recipe, command) = recipe_service.command("model", "generate").unwrap();
    assert_eq!(command.usage(), "generate <name> [table]");

    let generator = GeneratorService::new(Arc::new(LocalFilesystem::new()), project.path());
    generator
        .run(&recipe, &command.name, &["UserProfile", "user_profiles"])
        .unwrap();

    let model = std::fs::read_to_string(project.path().join("src/models/user_profile.rs")).unwrap();
    assert!(model.starts_with("pub struct UserProfile;"));

    let registry = std::fs::read_to_string(project.path().join("src/models/mod.rs")).unwrap();
    let registry: Vec<&str> = registry.lines().collect();
    assert_eq!(
        registry[..3],
        ["pub mod alpha;", "pub mod user_profile;", "pub mod zeta;"]
    );
    assert!(registry.contains(&"        \"user_profiles\""));
}

#[test]
fn legacy_encoded_file_survives_save_on_disk() {
    let project = TempDir::new().unwrap();
    let path = project.path().join("menu.txt");
    let original = b"Le caf\xe9 cr\xe8me co\xfbte deux euros, m\xeame \xe0 la gare.\n".to_vec();
    std::fs::write(&path, &original).unwrap();

    let fs = Arc::new(LocalFilesystem::new());
    File::new(fs.clone(), &path, None).save().unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), original);

    let edited = File::new(fs, &path, None);
    edited.lines().unwrap().left_pad("> ");
    edited.save().unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"> Le caf\xe9 cr\xe8me"));
}
