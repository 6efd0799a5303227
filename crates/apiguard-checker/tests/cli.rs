use apiguard_test_utils::ProjectTree;
use std::process::{Command, Output};

fn apiguard(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_apiguard"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn clean_tree_exits_zero() {
    let tree = ProjectTree::new();
    tree.file("src/a.js", "import m from '@/utils/api-mapping'\napi.getTagList()\n");
    let output = apiguard(&[tree.root().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("No API consistency issues found."));
}

#[test]
fn invalid_call_exits_one() {
    let tree = ProjectTree::new();
    tree.file("src/a.js", "api.totallyMadeUp()\n");
    let output = apiguard(&[tree.root().to_str().unwrap(), "--format", "json"]);
    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["invalid"][0]["site"]["method"], "totallyMadeUp");
}

#[test]
fn missing_root_exits_two() {
    let tree = ProjectTree::new();
    let missing = tree.path("nope");
    let output = apiguard(&[missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn bad_config_exits_two() {
    let tree = ProjectTree::new();
    tree.file("api.toml", "[registry.users]\nlist = 42\n");
    let output = apiguard(&[
        tree.root().to_str().unwrap(),
        "--config",
        tree.path("api.toml").to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn resolve_subcommand() {
    let output = apiguard(&["resolve", "categories.list"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output).trim(), "getChoiceQuestionCategories");

    let output = apiguard(&["resolve", "categories.nope"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn methods_duplicates() {
    let tree = ProjectTree::new();
    tree.file(
        "api.json",
        r#"{"registry": {
            "categories": {"list": "getCategoryList"},
            "examPapers": {"categories": "getCategoryList"}
        }}"#,
    );
    let config = tree.path("api.json");
    let output = apiguard(&["methods", "--duplicates", "--config", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output).trim(),
        "getCategoryList: categories.list, examPapers.categories"
    );
}

#[test]
fn fix_dry_run_then_write() {
    let tree = ProjectTree::new();
    tree.file("src/a.js", "api.getChoiceQuestionTags({ page: 1 })\n");
    let root = tree.root().to_str().unwrap().to_string();

    let output = apiguard(&["fix", &root]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("getChoiceQuestionTags -> getTagList"));
    assert_eq!(tree.read("src/a.js"), "api.getChoiceQuestionTags({ page: 1 })\n");

    let output = apiguard(&["fix", &root, "--write"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(tree.read("src/a.js"), "api.getTagList({ page: 1 })\n");
}

#[test]
fn report_to_file() {
    let tree = ProjectTree::new();
    tree.file("src/a.js", "api.getOldThingThatIsMissing()\n");
    let out = tree.path("report.txt");
    let output = apiguard(&[tree.root().to_str().unwrap(), "--output", out.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(tree.read("report.txt").contains("Invalid API methods"));
}

#[test]
fn json_report_to_file() {
    let tree = ProjectTree::new();
    tree.file("src/a.js", "api.getOldThingThatIsMissing()\n");
    let out = tree.path("report.json");
    let output = apiguard(&[
        tree.root().to_str().unwrap(),
        "--format",
        "json",
        "--output",
        out.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    let report: serde_json::Value = serde_json::from_str(&tree.read("report.json")).unwrap();
    assert_eq!(report["invalid"][0]["site"]["method"], "getOldThingThatIsMissing");
    assert_eq!(report["summary"]["invalid"], 1);
}

#[test]
fn unwritable_output_is_a_runtime_failure() {
    let tree = ProjectTree::new();
    tree.file("src/a.js", "api.getTagList()\n");
    let out = tree.path("no/such/dir/report.txt");
    let output = apiguard(&[tree.root().to_str().unwrap(), "--output", out.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("writing report"));
}

#[test]
fn fix_leaves_unregistered_replacements_alone() {
    let tree = ProjectTree::new();
    tree.file("src/a.js", "api.getChoiceQuestionCategories()\n");
    let root = tree.root().to_str().unwrap().to_string();

    let output = apiguard(&["fix", &root, "--write"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("getCategoryList"));
    assert_eq!(tree.read("src/a.js"), "api.getChoiceQuestionCategories()\n");

    let output = apiguard(&[&root]);
    assert_eq!(output.status.code(), Some(0));
}
