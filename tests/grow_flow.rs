//! End-to-end flows through the compiled binary: growing, renaming,
//! dependency pulling, duplicate handling, legacy migration, cleaning,
//! updating, and cache learning.

use assert_cmd::prelude::*;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn grow_cmd() -> Command {
    Command::cargo_bin("grow").expect("grow binary")
}

const TREE_REL: &str = "src/terrain/trees/_tree.scss";

/// Lay out a minimal source taxonomy inside a fresh temp project.
fn project() -> TempDir {
    let temp = TempDir::new().expect("temp project");
    temp.child("src/terrain/trunks/buttons.scss")
        .write_str(
            "\n.trunk-button {\n  padding: 1rem;\n  @include sprout-focus-ring();\n\n  &--primary {\n    color: blue;\n  }\n}\n",
        )
        .unwrap();
    temp.child("src/terrain/sprouts/behaviors.scss")
        .write_str("@mixin sprout-focus-ring() {\n  outline: 2px solid;\n}\n")
        .unwrap();
    temp.child("index.html")
        .write_str("<!DOCTYPE html>\n<html>\n<body>\n</body>\n</html>\n")
        .unwrap();
    temp
}

fn root_arg(temp: &TempDir) -> String {
    temp.path().display().to_string()
}

#[test]
fn grow_with_rename_and_auto_deps() {
    let temp = project();
    grow_cmd()
        .args([
            "grow",
            "trunk-button:hero-button",
            "--auto-deps",
            "--root",
            &root_arg(&temp),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("hero-button"));

    let tree = std::fs::read_to_string(temp.child(TREE_REL).path()).unwrap();
    assert!(tree.contains(".hero-button {"));
    assert!(tree.contains("&--primary"));
    assert!(tree.contains("@mixin sprout-focus-ring()"));
    assert!(!tree.contains(".trunk-button {"));

    // Dependencies land above the component that uses them
    let mixin = tree.find("@mixin sprout-focus-ring").unwrap();
    let trunk = tree.find(".hero-button {").unwrap();
    assert!(mixin < trunk);
}

#[test]
fn duplicate_grow_keeps_tree_and_host_stable() {
    let temp = project();
    let root = root_arg(&temp);
    grow_cmd()
        .args(["grow", "trunk-button", "--root", &root])
        .assert()
        .success();
    let tree_before = std::fs::read_to_string(temp.child(TREE_REL).path()).unwrap();
    let host_before = std::fs::read_to_string(temp.child("index.html").path()).unwrap();
    assert_eq!(host_before.matches("<!-- trunk-button -->").count(), 1);

    grow_cmd()
        .args(["grow", "trunk-button", "--root", &root])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    assert_eq!(
        std::fs::read_to_string(temp.child(TREE_REL).path()).unwrap(),
        tree_before
    );
    assert_eq!(
        std::fs::read_to_string(temp.child("index.html").path()).unwrap(),
        host_before
    );
}

#[test]
fn regrown_seed_keeps_a_single_tree_entry() {
    let temp = project();
    temp.child("src/terrain/seeds/_palette.scss")
        .write_str("$color-brand: #f00;\n")
        .unwrap();
    let root = root_arg(&temp);
    let host_before = std::fs::read_to_string(temp.child("index.html").path()).unwrap();

    grow_cmd()
        .args(["grow", "color-brand", "--root", &root])
        .assert()
        .success();
    grow_cmd()
        .args(["grow", "color-brand", "--root", &root])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    let tree = std::fs::read_to_string(temp.child(TREE_REL).path()).unwrap();
    assert_eq!(tree.matches("$color-brand: #f00;").count(), 1);
    assert_eq!(tree.matches("// color-brand (from color-brand)").count(), 1);
    // Seeds have no markup counterpart, so the host page stays put
    assert_eq!(
        std::fs::read_to_string(temp.child("index.html").path()).unwrap(),
        host_before
    );
}

#[test]
fn grown_trunk_injects_html_between_banners() {
    let temp = project();
    grow_cmd()
        .args(["grow", "trunk-button", "--root", &root_arg(&temp)])
        .assert()
        .success();

    let host = std::fs::read_to_string(temp.child("index.html").path()).unwrap();
    assert!(host.contains("<!-- 🌳 TRUNKS SECTION -->"));
    assert!(host.contains("<!-- trunk-button -->"));
    assert!(host.contains("<!-- End trunk-button -->"));
    let banner = host.find("🌳 TRUNKS SECTION").unwrap();
    let snippet = host.find("<!-- trunk-button -->").unwrap();
    let body_close = host.find("</body>").unwrap();
    assert!(banner < snippet && snippet < body_close);
}

#[test]
fn legacy_tree_is_migrated_before_growing() {
    let temp = project();
    temp.child(TREE_REL)
        .write_str("@use '../sprouts' as *;\n\n.old-card {\n  border: 1px solid;\n}\n")
        .unwrap();

    grow_cmd()
        .args(["grow", "trunk-button", "--root", &root_arg(&temp)])
        .assert()
        .success();

    let tree = std::fs::read_to_string(temp.child(TREE_REL).path()).unwrap();
    assert!(tree.contains("🌱 SPROUTS SECTION"));
    assert!(tree.contains("🌳 TRUNKS SECTION"));
    assert!(tree.contains("🍃 LEAFS SECTION"));
    assert!(tree.contains(".old-card {"));
    assert!(tree.contains(".trunk-button {"));
}

#[test]
fn batch_recovers_from_missing_components() {
    let temp = project();
    grow_cmd()
        .args([
            "grow",
            "trunk-ghost",
            "trunk-button",
            "--root",
            &root_arg(&temp),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("not found"))
        .stdout(predicate::str::contains("grown 1/2"));

    let tree = std::fs::read_to_string(temp.child(TREE_REL).path()).unwrap();
    assert!(tree.contains(".trunk-button {"));
}

#[test]
fn clean_then_update_round_trip() {
    let temp = project();
    let root = root_arg(&temp);
    grow_cmd()
        .args(["grow", "trunk-button", "--root", &root])
        .assert()
        .success();

    grow_cmd()
        .args(["clean", "trunk-button", "--root", &root])
        .assert()
        .success();
    let tree = std::fs::read_to_string(temp.child(TREE_REL).path()).unwrap();
    assert!(!tree.contains(".trunk-button {"));

    temp.child("src/terrain/trunks/buttons.scss")
        .write_str("\n.trunk-button {\n  padding: 3rem;\n}\n")
        .unwrap();
    grow_cmd()
        .args(["update", "trunk-button", "--root", &root])
        .assert()
        .success();
    let tree = std::fs::read_to_string(temp.child(TREE_REL).path()).unwrap();
    assert!(tree.contains("padding: 3rem;"));
}

#[test]
fn heuristic_hits_are_learned_into_the_cache() {
    let temp = project();
    // Not in any static table, only findable by scanning
    temp.child("src/terrain/trunks/misc.scss")
        .write_str("\n.trunk-fancy-widget {\n  margin: 0;\n}\n")
        .unwrap();

    let root = root_arg(&temp);
    grow_cmd()
        .args(["grow", "trunk-fancy-widget", "--root", &root])
        .assert()
        .success();

    let cache = std::fs::read_to_string(temp.child(".grow/grow-cache.trunks.json").path()).unwrap();
    assert!(cache.contains("trunk-fancy-widget"));
    assert!(cache.contains("misc.scss"));
    assert!(cache.contains("lastUpdated"));

    grow_cmd()
        .args(["cache", "list", "--root", &root])
        .assert()
        .success()
        .stdout(predicate::str::contains("trunk-fancy-widget"));
}

#[test]
fn promote_pulls_transitive_sprouts_in_order() {
    let temp = project();
    temp.child("src/terrain/sprouts/custom.scss")
        .write_str(
            "@mixin sprout-outer() {\n  @include sprout-inner();\n}\n\n@mixin sprout-inner() {\n  color: red;\n}\n",
        )
        .unwrap();

    grow_cmd()
        .args(["promote", "sprout-outer", "--root", &root_arg(&temp)])
        .assert()
        .success();

    let tree = std::fs::read_to_string(temp.child(TREE_REL).path()).unwrap();
    let inner = tree.find("@mixin sprout-inner").unwrap();
    let outer = tree.find("@mixin sprout-outer").unwrap();
    assert!(inner < outer);
}

#[test]
fn dry_run_reports_without_writing() {
    let temp = project();
    grow_cmd()
        .args(["--dry-run", "grow", "trunk-button", "--root", &root_arg(&temp)])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"));
    assert!(!temp.child(TREE_REL).path().exists());
}

#[test]
fn validate_reports_grown_project_as_valid() {
    let temp = project();
    let root = root_arg(&temp);
    grow_cmd()
        .args(["grow", "trunk-button", "--root", &root])
        .assert()
        .success();
    grow_cmd()
        .args(["validate", "--tree", "--root", &root])
        .assert()
        .success()
        .stdout(predicate::str::contains("components in tree"));
}

#[test]
fn new_scaffolds_a_growable_project() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().display().to_string();
    grow_cmd()
        .args(["new", "garden", "--root", &root])
        .assert()
        .success();

    let project_root = temp.child("garden");
    assert!(project_root.child("grow.toml").path().is_file());
    assert!(project_root.child(TREE_REL).path().is_file());
    assert!(project_root.child("src/harvest/images").path().is_dir());
}
