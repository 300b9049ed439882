#![cfg(unix)]
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for `refresh`, the on-demand link pass.
//!
//! Each test builds a throwaway Composer project, runs the command through
//! the library entry point, and inspects the disk and the registry.

mod common;

use std::path::PathBuf;

use common::*;
use composer_symlinks::cli::RefreshOpts;
use composer_symlinks::commands::{RunSummary, refresh};
use composer_symlinks::logging::{BufferedLog, LogLevel};
use serde_json::json;

fn refresh(project: &TestProject, dry_run: bool) -> (anyhow::Result<RunSummary>, BufferedLog) {
    project.with_host(|host| refresh::run(&project.global(), &RefreshOpts { dry_run }, host))
}

// ---------------------------------------------------------------------------
// Creation and idempotence
// ---------------------------------------------------------------------------

#[test]
fn creates_relative_symlink_and_registers_it() {
    let project = TestProjectBuilder::new()
        .with_file("assets/app.css")
        .with_config(json!({"symlinks": {"assets/app.css": "public/app.css"}}))
        .build();

    let (result, log) = refresh(&project, false);

    assert_eq!(result.unwrap().created, 1);
    assert_eq!(project.read_link("public/app.css"), PathBuf::from("../assets/app.css"));
    assert!(lines(&log, LogLevel::Info).contains("Symlinking"));
    assert_eq!(
        project.registry().get(&project.key("public/app.css")),
        Some(&project.key("assets/app.css"))
    );
}

#[test]
fn absolute_path_option_creates_absolute_symlink() {
    let project = TestProjectBuilder::new()
        .with_dir("shared")
        .with_config(json!({
            "symlinks": {"shared": "web/shared"},
            "absolute-path": true
        }))
        .build();

    refresh(&project, false).0.unwrap();

    assert_eq!(project.read_link("web/shared"), project.path("shared"));
}

#[test]
fn second_run_is_a_no_op() {
    let project = TestProjectBuilder::new()
        .with_file("assets/app.css")
        .with_config(json!({"symlinks": {"assets/app.css": "public/app.css"}}))
        .build();

    refresh(&project, false).0.unwrap();
    let (result, log) = refresh(&project, false);

    assert_eq!(result.unwrap().created, 0);
    assert!(lines(&log, LogLevel::Info).contains("Already linked"));
    assert!(log.messages(LogLevel::Warn).is_empty());
    assert_eq!(project.registry().len(), 1);
}

// ---------------------------------------------------------------------------
// Conflicts and force-create
// ---------------------------------------------------------------------------

#[test]
fn occupied_destination_is_skipped_with_warning() {
    let project = TestProjectBuilder::new()
        .with_file("assets/app.css")
        .with_file("public/app.css")
        .with_config(json!({"symlinks": {"assets/app.css": "public/app.css"}}))
        .build();

    let (result, log) = refresh(&project, false);

    assert_eq!(result.unwrap().skipped, 1);
    assert!(lines(&log, LogLevel::Warn).contains("Skipped"));
    assert!(!project.path("public/app.css").is_symlink());
}

#[test]
fn force_create_replaces_plain_file() {
    let project = TestProjectBuilder::new()
        .with_file("assets/app.css")
        .with_file("public/app.css")
        .with_config(json!({
            "symlinks": {"assets/app.css": "public/app.css"},
            "force-create": true
        }))
        .build();

    refresh(&project, false).0.unwrap();

    assert!(project.path("public/app.css").is_symlink());
    assert_eq!(
        std::fs::read_to_string(project.path("public/app.css")).unwrap(),
        "assets/app.css"
    );
}

#[test]
fn force_create_replaces_wrong_symlink() {
    let project = TestProjectBuilder::new()
        .with_file("right.txt")
        .with_file("wrong.txt")
        .with_config(json!({
            "symlinks": {"right.txt": {"link": "link.txt", "force-create": true}}
        }))
        .build();
    std::os::unix::fs::symlink("wrong.txt", project.path("link.txt")).unwrap();

    refresh(&project, false).0.unwrap();

    assert_eq!(project.read_link("link.txt"), PathBuf::from("right.txt"));
}

// ---------------------------------------------------------------------------
// Dry run
// ---------------------------------------------------------------------------

#[test]
fn dry_run_touches_nothing() {
    let project = TestProjectBuilder::new()
        .with_file("assets/app.css")
        .with_config(json!({"symlinks": {"assets/app.css": "public/app.css"}}))
        .build();

    let (result, log) = refresh(&project, true);

    assert_eq!(result.unwrap().created, 1);
    assert!(lines(&log, LogLevel::DryRun).contains("Symlinking"));
    assert!(!project.path("public/app.css").exists());
    assert!(!project.registry_file().exists());
}

#[test]
fn dry_run_reports_existing_destination() {
    let project = TestProjectBuilder::new()
        .with_file("assets/app.css")
        .with_file("public/app.css")
        .with_config(json!({"symlinks": {"assets/app.css": "public/app.css"}}))
        .build();

    let (result, log) = refresh(&project, true);

    assert_eq!(result.unwrap().skipped, 1);
    assert!(lines(&log, LogLevel::Warn).contains("already exists"));
}

// ---------------------------------------------------------------------------
// Registry cleanup
// ---------------------------------------------------------------------------

#[test]
fn cleanup_removes_links_dropped_from_config() {
    let project = TestProjectBuilder::new()
        .with_file("a.txt")
        .with_file("b.txt")
        .with_config(json!({
            "symlinks": {"a.txt": "link-a.txt", "b.txt": "link-b.txt"},
            "cleanup": true
        }))
        .build();
    refresh(&project, false).0.unwrap();
    assert_eq!(project.registry().len(), 2);

    project.set_config(&json!({
        "symlinks": {"a.txt": "link-a.txt"},
        "cleanup": true
    }));
    let (result, log) = refresh(&project, false);

    result.unwrap();
    assert!(project.path("link-a.txt").is_symlink());
    assert!(!project.path("link-b.txt").exists());
    assert!(!project.path("link-b.txt").is_symlink());
    assert_eq!(
        project.registry().keys().cloned().collect::<Vec<_>>(),
        vec![project.key("link-a.txt")]
    );
    assert!(lines(&log, LogLevel::Info).contains("Removed"));
}

#[test]
fn without_cleanup_dropped_links_stay_registered() {
    let project = TestProjectBuilder::new()
        .with_file("a.txt")
        .with_file("b.txt")
        .with_config(json!({"symlinks": {"a.txt": "link-a.txt", "b.txt": "link-b.txt"}}))
        .build();
    refresh(&project, false).0.unwrap();

    project.set_config(&json!({"symlinks": {"a.txt": "link-a.txt"}}));
    refresh(&project, false).0.unwrap();

    assert!(project.path("link-b.txt").is_symlink());
    assert_eq!(project.registry().len(), 2);
}

#[test]
fn registry_drops_entries_removed_by_hand() {
    let project = TestProjectBuilder::new()
        .with_file("a.txt")
        .with_file("b.txt")
        .with_config(json!({"symlinks": {"a.txt": "link-a.txt", "b.txt": "link-b.txt"}}))
        .build();
    refresh(&project, false).0.unwrap();

    std::fs::remove_file(project.path("link-b.txt")).unwrap();
    project.set_config(&json!({"symlinks": {"a.txt": "link-a.txt"}}));
    refresh(&project, false).0.unwrap();

    assert_eq!(project.registry().len(), 1);
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[test]
fn missing_target_aborts_by_default() {
    let project = TestProjectBuilder::new()
        .with_config(json!({"symlinks": {"missing.txt": "link.txt"}}))
        .build();

    let err = refresh(&project, false).0.unwrap_err();

    assert!(err.to_string().contains("does not exist"));
    assert!(!project.registry_file().exists());
}

#[test]
fn missing_target_is_skipped_when_configured() {
    let project = TestProjectBuilder::new()
        .with_config(json!({
            "symlinks": {"missing.txt": "link.txt"},
            "skip-missing-target": true
        }))
        .build();

    let summary = refresh(&project, false).0.unwrap();

    assert_eq!(summary, RunSummary::default());
    assert!(!project.path("link.txt").exists());
}

#[test]
fn placeholder_link_inside_vendor_dir() {
    let project = TestProjectBuilder::new()
        .with_file("config/app.php")
        .with_config(json!({"symlinks": {"config/app.php": "%vendor-dir%/acme/app.php"}}))
        .build();

    refresh(&project, false).0.unwrap();

    assert!(project.path("vendor/acme/app.php").is_symlink());
}

#[test]
fn env_placeholder_resolves_target() {
    let project = TestProjectBuilder::new()
        .with_file("env/prod/settings.ini")
        .with_config(json!({"symlinks": {"env/%env(APP_ENV)%/settings.ini": "settings.ini"}}))
        .with_env("APP_ENV", "prod")
        .build();

    refresh(&project, false).0.unwrap();

    assert_eq!(
        project.read_link("settings.ini"),
        PathBuf::from("env/prod/settings.ini")
    );
}

#[test]
fn php_version_condition_filters_links() {
    let project = TestProjectBuilder::new()
        .with_file("php7.ini")
        .with_file("php8.ini")
        .with_config(json!({"symlinks": {
            "php7.ini": {"link": "php.ini", "conditions": {"php-version": "<8.0"}},
            "php8.ini": {"link": "php.ini", "conditions": {"php-version": "^8.1"}}
        }}))
        .build();

    refresh(&project, false).0.unwrap();

    assert_eq!(project.read_link("php.ini"), PathBuf::from("php8.ini"));
}

#[test]
fn missing_manifest_is_an_error() {
    let project = TestProjectBuilder::new().build();
    std::fs::remove_file(project.path("composer.json")).unwrap();

    let err = refresh(&project, false).0.unwrap_err();

    assert!(format!("{err:#}").contains("composer.json"));
}
