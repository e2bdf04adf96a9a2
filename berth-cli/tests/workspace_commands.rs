use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;

use berth_core::{workspace, ContextName, WorkspaceId};
use tempfile::TempDir;

fn berth_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("berth"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("RUST_LOG");
    cmd
}

fn berth(home: &Path, args: &[&str]) {
    berth_cmd(home).args(args).assert().success();
}

fn binding(home: &Path, id: &str) -> String {
    workspace::load_workspace_at(home, &ContextName::default(), &WorkspaceId::from(id))
        .expect("load workspace")
        .provider
        .name
        .0
}

fn seeded() -> TempDir {
    let home = TempDir::new().expect("home");
    berth(home.path(), &["provider", "add", "a", "--use"]);
    berth(home.path(), &["provider", "add", "b"]);
    berth(home.path(), &["workspace", "add", "./code/MyRepo", "--source", "git@example.com:me/repo"]);
    berth(home.path(), &["workspace", "add", "other"]);
    home
}

#[test]
fn add_derives_id_from_path() {
    let home = seeded();
    assert_eq!(binding(home.path(), "myrepo"), "a");
}

#[test]
fn add_without_provider_or_default_fails() {
    let home = TempDir::new().expect("home");
    berth(home.path(), &["provider", "add", "a"]);

    berth_cmd(home.path())
        .args(["workspace", "add", "w1"])
        .assert()
        .failure()
        .stderr(contains("no default provider"));
}

#[test]
fn add_with_unknown_provider_fails() {
    let home = seeded();
    berth_cmd(home.path())
        .args(["workspace", "add", "w9", "--provider", "ghost"])
        .assert()
        .failure()
        .stderr(contains("does not exist"));
}

#[test]
fn rebind_moves_only_the_named_workspace() {
    let home = seeded();

    berth_cmd(home.path())
        .args(["workspace", "rebind", "MyRepo", "b"])
        .assert()
        .success()
        .stdout(contains("Workspace 'myrepo' rebound from 'a' to 'b'"));

    assert_eq!(binding(home.path(), "myrepo"), "b");
    assert_eq!(binding(home.path(), "other"), "a");
}

#[test]
fn rebind_to_missing_provider_fails_and_keeps_binding() {
    let home = seeded();

    berth_cmd(home.path())
        .args(["workspace", "rebind", "other", "ghost"])
        .assert()
        .failure()
        .stderr(contains("target provider 'ghost' not found"));
    assert_eq!(binding(home.path(), "other"), "a");
}

#[test]
fn rebind_of_unknown_workspace_fails() {
    let home = seeded();
    berth_cmd(home.path())
        .args(["workspace", "rebind", "nope", "b"])
        .assert()
        .failure()
        .stderr(contains("not found"));
}

#[test]
fn rebind_requires_exactly_two_arguments() {
    let home = seeded();
    berth_cmd(home.path())
        .args(["workspace", "rebind", "other"])
        .assert()
        .failure();
}

#[test]
fn list_json_reports_bindings() {
    let home = seeded();

    let output = berth_cmd(home.path())
        .args(["workspace", "list", "--json"])
        .output()
        .expect("run list");
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let rows = parsed.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], "myrepo");
    assert_eq!(rows[0]["provider"], "a");
    assert_eq!(rows[0]["source"], "git@example.com:me/repo");
    assert_eq!(rows[1]["id"], "other");
}

#[test]
fn delete_removes_record() {
    let home = seeded();
    berth(home.path(), &["workspace", "delete", "other"]);

    assert!(workspace::load_workspace_at(
        home.path(),
        &ContextName::default(),
        &WorkspaceId::from("other")
    )
    .unwrap_err()
    .is_not_found());

    berth_cmd(home.path())
        .args(["workspace", "delete", "other"])
        .assert()
        .failure();
    berth(home.path(), &["workspace", "delete", "other", "--ignore-not-found"]);
}
