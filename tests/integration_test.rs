use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

fn linkitem_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_linkitem"))
}

fn run(tmp: &TempDir, args: &[&str]) -> Output {
    linkitem_cmd()
        .current_dir(tmp.path())
        .args(args)
        .output()
        .unwrap()
}

fn init_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let output = run(&tmp, &["init"]);
    assert!(output.status.success());
    tmp
}

/// Run a command with --json and return the created entity's id
fn created_id(tmp: &TempDir, args: &[&str]) -> String {
    let mut args = args.to_vec();
    args.push("--json");
    let output = run(tmp, &args);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    json["id"].as_str().unwrap().to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_init_creates_linkitem_directory() {
    let tmp = init_project();
    assert!(tmp.path().join(".linkitem").exists());
    assert!(tmp.path().join(".linkitem/links.db").exists());
}

#[test]
fn test_init_twice_fails() {
    let tmp = init_project();

    let output = run(&tmp, &["init"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Already initialized"));
}

#[test]
fn test_add_without_init_fails() {
    let tmp = TempDir::new().unwrap();

    let output = run(&tmp, &["add", "Contact", "--type=email", "--email=a@b.com"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Not in a linkitem project"));
}

#[test]
fn test_add_and_resolve_each_type() {
    let tmp = init_project();

    let page = created_id(&tmp, &["page", "add", "About", "/about/"]);
    let file = created_id(&tmp, &["asset", "add", "file", "guide.pdf", "/assets/guide.pdf"]);
    let image = created_id(&tmp, &["asset", "add", "image", "logo.png", "/assets/logo.png"]);

    let page_flag = format!("--page={}", page);
    let file_flag = format!("--file={}", file);
    let image_flag = format!("--image={}", image);

    let cases: Vec<(Vec<&str>, &str)> = vec![
        (vec!["add", "Top", "--type=anchor", "--anchor=top"], "#top"),
        (vec!["add", "About", "--type=internal", &page_flag], "/about/"),
        (
            vec!["add", "Docs", "--type=external", "--url=https://docs.example.com"],
            "https://docs.example.com",
        ),
        (vec!["add", "Mail", "--type=email", "--email=a@b.com"], "mailto:a@b.com"),
        (vec!["add", "Call", "--type=telephone", "--phone=123"], "tel:+123"),
        (vec!["add", "Guide", "--type=file", &file_flag], "/assets/guide.pdf"),
        (vec!["add", "Logo", "--type=image", &image_flag], "/assets/logo.png"),
    ];

    for (args, expected) in cases {
        let id = created_id(&tmp, &args);
        let output = run(&tmp, &["resolve", &id]);
        assert!(output.status.success());
        assert_eq!(stdout(&output).trim_end(), expected);
    }
}

#[test]
fn test_add_requires_link_type() {
    let tmp = init_project();

    let output = run(&tmp, &["add", "Untyped"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("LinkType is required"));
}

#[test]
fn test_add_requires_title() {
    let tmp = init_project();

    let output = run(&tmp, &["add", "  ", "--type=anchor"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Title is required"));
}

#[test]
fn test_add_rejects_unknown_type() {
    let tmp = init_project();

    let output = run(&tmp, &["add", "Fax", "--type=fax"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid link type: fax"));
}

#[test]
fn test_list_shows_summary_in_sort_order() {
    let tmp = init_project();

    run(&tmp, &["add", "Second", "--type=anchor", "--anchor=b", "--sort=20"]);
    run(&tmp, &["add", "First", "--type=anchor", "--anchor=a", "--sort=10"]);

    let output = run(&tmp, &["list"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Link Items"));
    let first = out.find("First").unwrap();
    let second = out.find("Second").unwrap();
    assert!(first < second);
    assert!(out.contains("#a"));

    let output = run(&tmp, &["list", "--json"]);
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["title"], "First");
    assert_eq!(json[0]["link"], "#a");
}

#[test]
fn test_update_versions_and_rollback() {
    let tmp = init_project();
    let id = created_id(
        &tmp,
        &["add", "Docs", "--type=external", "--url=https://v1.example.com"],
    );

    let output = run(&tmp, &["update", &id, "--url=https://v2.example.com"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&run(&tmp, &["resolve", &id])).trim_end(),
        "https://v2.example.com"
    );

    let output = run(&tmp, &["versions", &id, "--json"]);
    let versions: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(versions.as_array().unwrap().len(), 2);

    let output = run(&tmp, &["rollback", &id, "1"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&run(&tmp, &["resolve", &id])).trim_end(),
        "https://v1.example.com"
    );
}

#[test]
fn test_publish_and_resolve_live() {
    let tmp = init_project();
    let id = created_id(&tmp, &["add", "Top", "--type=anchor", "--anchor=top"]);

    let output = run(&tmp, &["resolve", &id, "--live"]);
    assert!(!output.status.success());

    let output = run(&tmp, &["publish", &id]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("version 1"));

    run(&tmp, &["update", &id, "--anchor=bottom"]);
    assert_eq!(stdout(&run(&tmp, &["resolve", &id, "--live"])).trim_end(), "#top");
    assert_eq!(stdout(&run(&tmp, &["resolve", &id])).trim_end(), "#bottom");
}

#[test]
fn test_delete_cascades_to_owned_file() {
    let tmp = init_project();
    let file = created_id(&tmp, &["asset", "add", "file", "guide.pdf", "/assets/guide.pdf"]);
    let file_flag = format!("--file={}", file);
    let id = created_id(&tmp, &["add", "Guide", "--type=file", &file_flag]);

    // Non-interactive delete needs --force
    let output = run(&tmp, &["delete", &id]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--force"));

    let output = run(&tmp, &["delete", &id, "--force"]);
    assert!(output.status.success());

    let output = run(&tmp, &["asset", "list", "--json"]);
    let assets: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(assets.as_array().unwrap().is_empty());
}

#[test]
fn test_duplicate_copies_owned_image() {
    let tmp = init_project();
    let image = created_id(&tmp, &["asset", "add", "image", "logo.png", "/assets/logo.png"]);
    let image_flag = format!("--image={}", image);
    let id = created_id(&tmp, &["add", "Logo", "--type=image", &image_flag]);

    let copy = created_id(&tmp, &["duplicate", &id]);
    assert_ne!(copy, id);
    assert_eq!(
        stdout(&run(&tmp, &["resolve", &copy])).trim_end(),
        "/assets/logo.png"
    );

    let output = run(&tmp, &["asset", "list", "--json"]);
    let assets: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(assets.as_array().unwrap().len(), 2);
}

#[test]
fn test_types_and_targets() {
    let tmp = TempDir::new().unwrap();

    let output = run(&tmp, &["types", "--json"]);
    assert!(output.status.success());
    let out = stdout(&output);
    let order: Vec<usize> = [
        "\"anchor\"",
        "\"internal\"",
        "\"external\"",
        "\"email\"",
        "\"telephone\"",
        "\"file\"",
        "\"image\"",
    ]
    .iter()
    .map(|tag| out.find(tag).unwrap())
    .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]));
    assert!(out.contains("Anchor link"));

    let output = run(&tmp, &["targets", "--json"]);
    let targets: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(targets, serde_json::json!({ "_blank": "New tab" }));
}

#[test]
fn test_config_hooks_apply() {
    let tmp = init_project();
    fs::write(
        tmp.path().join(".linkitem/config.yaml"),
        "link_suffix: \"?ref=cms\"\ntype_labels:\n  anchor: Jump link\nhidden_types:\n  - telephone\n",
    )
    .unwrap();

    let id = created_id(&tmp, &["add", "Mail", "--type=email", "--email=a@b.com"]);
    assert_eq!(
        stdout(&run(&tmp, &["resolve", &id])).trim_end(),
        "mailto:a@b.com?ref=cms"
    );

    let out = stdout(&run(&tmp, &["types"]));
    assert!(out.contains("Jump link"));
    assert!(!out.contains("telephone"));
}

#[test]
fn test_assets_are_checked_for_kind_and_owner() {
    let tmp = init_project();
    let file = created_id(&tmp, &["asset", "add", "file", "guide.pdf", "/assets/guide.pdf"]);
    let file_flag = format!("--file={}", file);
    let image_flag = format!("--image={}", file);

    let output = run(&tmp, &["add", "Logo", "--type=image", &image_flag]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("not found"));

    created_id(&tmp, &["add", "Guide", "--type=file", &file_flag]);
    let output = run(&tmp, &["add", "Guide again", "--type=file", &file_flag]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("already owned"));
}
