//! Integration tests for the fitcat binary.
//!
//! These tests verify end-to-end behavior including:
//! - Seeding from resource files and from the built-in fallback
//! - Normalization and scoped clearing against the on-disk store
//! - Name resolution
//! - Refusal to touch a corrupt store

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const EXERCISES: &str = "\
nameEN,nameTR,category,equipment,supportsWeight,supportsReps,supportsTime,supportsDistance
Bench Press,Göğüs Presi,push,barbell,true,true,false,false
Squat,Çömelme,legs,barbell,true,true,false,false
Face Pull,Yüz Çekişi,mystery,cable,true,true,false,false
broken row
";

const FOODS: &str = "\
nameEN,nameTR,brand,calories,protein,carbs,fat,category
Apple,Elma,,52,0.3,14,0.2,fruits
Banana,,,89,1.1,23,0.3,
";

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn write_resources(dir: &Path) {
    let resources = dir.join("resources");
    fs::create_dir_all(&resources).unwrap();
    fs::write(resources.join("exercises.csv"), EXERCISES).unwrap();
    fs::write(resources.join("foods.csv"), FOODS).unwrap();
}

/// The binary, pointed at `dir` for data and isolated from the user's config
fn cli(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fitcat"));
    cmd.env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(dir.path());
    cmd
}

fn status_json(dir: &TempDir) -> serde_json::Value {
    let output = cli(dir).args(["status", "--json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).expect("status output is JSON")
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("fitcat"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Exercise and food reference catalog maintenance",
        ))
        .stdout(predicate::str::contains("reseed-exercises"));
}

#[test]
fn test_seed_from_resources() {
    let temp_dir = setup_test_dir();
    write_resources(temp_dir.path());

    cli(&temp_dir)
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("exercise: 3 inserted from 4 rows"))
        .stdout(predicate::str::contains("1 rejected"))
        .stdout(predicate::str::contains("food: 2 inserted"));

    assert!(temp_dir.path().join("catalog.json").exists());
    let status = status_json(&temp_dir);
    assert_eq!(status["exercises"], 3);
    assert_eq!(status["foods"], 2);
}

#[test]
fn test_seed_report_json() {
    let temp_dir = setup_test_dir();
    write_resources(temp_dir.path());

    let output = cli(&temp_dir).args(["seed", "--json"]).output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(report["seeded"], true);
    assert_eq!(report["phases"].as_array().unwrap().last().unwrap(), "done");
    assert_eq!(report["exercises"]["rejected"], 1);
    // "mystery" category is backfilled, uncategorized Banana is classified
    assert_eq!(report["normalization"]["exercises_recategorized"], 1);
    assert_eq!(report["normalization"]["foods"]["recategorized"], 1);
    assert_eq!(report["normalization"]["foods"]["still_other"], 0);
}

#[test]
fn test_seed_without_resources_uses_fallback() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("fallback"));

    let status = status_json(&temp_dir);
    assert!(status["exercises"].as_u64().unwrap() > 0);
    assert!(status["foods"].as_u64().unwrap() > 0);

    cli(&temp_dir)
        .args(["resolve", "Squat", "Plank"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not found").not());
}

#[test]
fn test_second_seed_is_skipped() {
    let temp_dir = setup_test_dir();
    write_resources(temp_dir.path());

    cli(&temp_dir).arg("seed").assert().success();
    let revision = status_json(&temp_dir)["revision"].as_u64().unwrap();

    cli(&temp_dir)
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("seeding skipped"));

    let status = status_json(&temp_dir);
    assert_eq!(status["exercises"], 3);
    // Already normalized, so nothing was written
    assert_eq!(status["revision"].as_u64().unwrap(), revision);
}

#[test]
fn test_resources_override() {
    let temp_dir = setup_test_dir();
    let bundle = temp_dir.path().join("bundle");
    fs::create_dir_all(&bundle).unwrap();
    fs::write(
        bundle.join("exercises.csv"),
        "nameEN,nameTR,category,equipment\nRow,Kürek,pull,cable\n",
    )
    .unwrap();

    cli(&temp_dir)
        .arg("--resources")
        .arg(&bundle)
        .arg("seed")
        .assert()
        .success();

    assert_eq!(status_json(&temp_dir)["exercises"], 1);
}

#[test]
fn test_resolve_by_either_name() {
    let temp_dir = setup_test_dir();
    write_resources(temp_dir.path());
    cli(&temp_dir).arg("seed").assert().success();

    let output = cli(&temp_dir)
        .args(["resolve", "Bench Press", "Göğüs Presi", "bench press"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let ids: Vec<&str> = stdout
        .lines()
        .map(|line| line.split('\t').nth(1).unwrap())
        .collect();

    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], ids[1]);
    assert_eq!(ids[2], "(not found)");
}

#[test]
fn test_clear_exercises_keeps_foods() {
    let temp_dir = setup_test_dir();
    write_resources(temp_dir.path());
    cli(&temp_dir).arg("seed").assert().success();

    cli(&temp_dir)
        .arg("clear-exercises")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 3 exercises"));

    let status = status_json(&temp_dir);
    assert_eq!(status["exercises"], 0);
    assert_eq!(status["foods"], 2);
}

#[test]
fn test_clear_foods_keeps_exercises() {
    let temp_dir = setup_test_dir();
    write_resources(temp_dir.path());
    cli(&temp_dir).arg("seed").assert().success();

    cli(&temp_dir).arg("clear-foods").assert().success();

    let status = status_json(&temp_dir);
    assert_eq!(status["exercises"], 3);
    assert_eq!(status["foods"], 0);
}

#[test]
fn test_reseed_exercises() {
    let temp_dir = setup_test_dir();
    write_resources(temp_dir.path());
    cli(&temp_dir).arg("seed").assert().success();

    fs::write(
        temp_dir.path().join("resources/exercises.csv"),
        "nameEN,nameTR,category,equipment\nDeadlift,Deadlift,strength,barbell\n",
    )
    .unwrap();
    cli(&temp_dir).arg("reseed-exercises").assert().success();

    let status = status_json(&temp_dir);
    assert_eq!(status["exercises"], 1);
    assert_eq!(status["foods"], 2);

    cli(&temp_dir)
        .args(["resolve", "Deadlift", "Squat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Squat\t(not found)"));
}

#[test]
fn test_normalize_is_idempotent() {
    let temp_dir = setup_test_dir();
    write_resources(temp_dir.path());
    cli(&temp_dir).arg("seed").assert().success();

    cli(&temp_dir)
        .arg("normalize")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 exercises recategorized"));
}

#[test]
fn test_status_on_missing_store() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exercises: 0"));

    // Reading never creates the store document
    assert!(!temp_dir.path().join("catalog.json").exists());
}

#[test]
fn test_corrupt_store_is_reported_and_kept() {
    let temp_dir = setup_test_dir();
    let store_path = temp_dir.path().join("catalog.json");
    fs::write(&store_path, "{ not a catalog").unwrap();

    cli(&temp_dir)
        .arg("seed")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Database error"));

    assert_eq!(fs::read_to_string(&store_path).unwrap(), "{ not a catalog");
}

#[test]
fn test_config_file_overrides_store_name() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("fitcat.toml");
    fs::write(&config_path, "[data]\nstore_file = \"custom.json\"\n").unwrap();

    cli(&temp_dir)
        .arg("--config")
        .arg(&config_path)
        .arg("seed")
        .assert()
        .success();

    assert!(temp_dir.path().join("custom.json").exists());
    assert!(!temp_dir.path().join("catalog.json").exists());
}
