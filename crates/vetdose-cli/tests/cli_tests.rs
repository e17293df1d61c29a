//! Integration tests for the vetdose binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CATALOG: &str = r#"[
  {
    "name": "Amoxicillin",
    "species": "both",
    "category": "Antibiotic",
    "dosage_guidelines": [
      { "min_weight_kg": 1, "max_weight_kg": 10, "dosage_mg_per_kg": 4, "frequency_per_day": 2, "duration_days": 7, "notes": "Give with food" }
    ]
  },
  {
    "name": "Rimadyl",
    "generic_name": "Carprofen",
    "species": "dog",
    "category": "NSAID",
    "dosage_guidelines": [
      { "min_weight_kg": 2, "max_weight_kg": 60, "dosage_mg_per_kg": 2.2, "frequency_per_day": 2 }
    ]
  }
]"#;

/// Temp dir with an empty config and an imported catalog.
fn setup() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = dir.path().join("catalog.db");
    let config = dir.path().join("config.toml");
    fs::write(&config, "").unwrap();

    let catalog = dir.path().join("catalog.json");
    fs::write(&catalog, CATALOG).unwrap();

    cli(&db, &config)
        .args(["import", catalog.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 medications"));

    (dir, db, config)
}

fn cli(db: &Path, config: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vetdose"));
    cmd.arg("--db").arg(db).arg("--config").arg(config);
    cmd
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("vetdose"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Veterinary medication dosage calculator"));
}

#[test]
fn test_calc_kg() {
    let (_dir, db, config) = setup();

    cli(&db, &config)
        .args(["calc", "Amoxicillin", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("20.00 mg"))
        .stdout(predicate::str::contains("2x daily"))
        .stdout(predicate::str::contains("7 days"))
        .stdout(predicate::str::contains("Give with food"));
}

#[test]
fn test_calc_lbs_rounds_for_display() {
    let (_dir, db, config) = setup();

    cli(&db, &config)
        .args(["calc", "amoxicillin", "11", "--unit", "lbs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("19.96 mg"));
}

#[test]
fn test_calc_no_match_is_advisory() {
    let (_dir, db, config) = setup();

    cli(&db, &config)
        .args(["calc", "Amoxicillin", "15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No dosage guideline"));
}

#[test]
fn test_calc_invalid_weight_fails() {
    let (_dir, db, config) = setup();

    cli(&db, &config)
        .args(["calc", "Amoxicillin", "heavy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("valid weight"));

    cli(&db, &config)
        .args(["calc", "Amoxicillin", "-3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("valid weight"));
}

#[test]
fn test_calc_requires_exact_medication_name() {
    let (_dir, db, config) = setup();

    cli(&db, &config)
        .args(["calc", "rimantadine", "10"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("mg").not())
        .stderr(predicate::str::contains("No medication named 'rimantadine'"))
        .stderr(predicate::str::contains("Did you mean Rimadyl"));

    cli(&db, &config)
        .args(["calc", "zzzz", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No medication named 'zzzz'"))
        .stderr(predicate::str::contains("Did you mean").not());

    cli(&db, &config)
        .args(["calc", "RIMADYL", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("22.00 mg"));
}

#[test]
fn test_favorite_requires_exact_medication_name() {
    let (_dir, db, config) = setup();

    cli(&db, &config)
        .args(["favorite", "rimantadine", "--user", "vet-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Did you mean Rimadyl"));

    cli(&db, &config)
        .args(["favorites", "--user", "vet-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No favorites yet."));
}

#[test]
fn test_config_source_is_logged() {
    let (_dir, db, config) = setup();

    cli(&db, &config)
        .env_remove("RUST_LOG")
        .args(["list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Loaded config from"));
}

#[test]
fn test_list_species_filter() {
    let (_dir, db, config) = setup();

    cli(&db, &config)
        .args(["list", "--species", "cat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Amoxicillin"))
        .stdout(predicate::str::contains("Rimadyl").not());
}

#[test]
fn test_show_by_generic_name() {
    let (_dir, db, config) = setup();

    cli(&db, &config)
        .args(["show", "carprofen"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rimadyl (Carprofen)"))
        .stdout(predicate::str::contains("2-60 kg: 2.2 mg/kg"));
}

#[test]
fn test_add_rejects_inverted_band() {
    let (dir, db, config) = setup();
    let file = dir.path().join("bad.json");
    fs::write(
        &file,
        r#"{ "name": "Bad", "species": "cat", "category": "Other",
             "dosage_guidelines": [ { "min_weight_kg": 10, "max_weight_kg": 1, "dosage_mg_per_kg": 1, "frequency_per_day": 1 } ] }"#,
    )
    .unwrap();

    cli(&db, &config)
        .args(["add", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("maximum weight"));
}

#[test]
fn test_favorites_and_history() {
    let (_dir, db, config) = setup();

    cli(&db, &config)
        .args(["favorite", "Rimadyl", "--user", "vet-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Rimadyl to favorites"));

    cli(&db, &config)
        .args(["favorites", "--user", "vet-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rimadyl"));

    cli(&db, &config)
        .args(["calc", "Rimadyl", "10", "--user", "vet-1"])
        .assert()
        .success();

    cli(&db, &config)
        .args(["history", "--user", "vet-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rimadyl"))
        .stdout(predicate::str::contains("22.00 mg"));
}
