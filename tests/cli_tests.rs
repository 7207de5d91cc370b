//! End-to-end CLI tests running the compiled binary.
//!
//! Each test gets its own temporary directory holding a config file
//! and a fresh database, so invocations compose into real flows:
//! seed, place, result, board.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_config(dir: &Path) -> PathBuf {
    let db = dir.join("ledger.db");
    let config = dir.join("config.toml");
    fs::write(
        &config,
        format!(
            "[database]\npath = {:?}\n\n[logging]\nlevel = \"warn\"\n",
            db.to_string_lossy()
        ),
    )
    .expect("write config");
    config
}

fn toteboard(config: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_toteboard"));
    cmd.arg("--config").arg(config);
    cmd.env_remove("TOTEBOARD_DATABASE");
    cmd
}

fn workspace() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = write_config(dir.path());
    (dir, config)
}

#[test]
fn seed_place_result_board_round_out_a_match() {
    let (_dir, config) = workspace();

    toteboard(&config)
        .args(["seed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 accounts created"))
        .stdout(predicate::str::contains("match m1 scheduled"));

    toteboard(&config)
        .args([
            "--json", "place", "--account", "u1", "--match", "m1", "--participant", "alpha",
            "--amount", "5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"odds\":\"2.00\""))
        .stdout(predicate::str::contains("\"payout\":\"10.00\""))
        .stdout(predicate::str::contains("\"balance\":\"95\""));

    toteboard(&config)
        .args([
            "--json", "result", "--match", "m1", "--status", "completed", "--winner", "alpha",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\":\"completed\""))
        .stdout(predicate::str::contains("\"winner\":\"alpha\""))
        .stdout(predicate::str::contains("\"stakes_won\":1"))
        .stdout(predicate::str::contains("\"stakes_lost\":0"));

    toteboard(&config)
        .args(["--json", "board", "--match", "m1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"command\":\"board\""))
        .stdout(predicate::str::contains("\"pool\":\"5\""))
        .stdout(predicate::str::contains("\"status\":\"won\""));
}

#[test]
fn seeding_twice_leaves_balances_alone() {
    let (_dir, config) = workspace();

    toteboard(&config).args(["seed"]).assert().success();
    toteboard(&config)
        .args([
            "place", "--account", "u1", "--match", "m1", "--participant", "beta", "--amount",
            "30",
        ])
        .assert()
        .success();

    toteboard(&config)
        .args(["--json", "seed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"accounts_created\":0"))
        .stdout(predicate::str::contains("\"accounts_existing\":4"))
        .stdout(predicate::str::contains("\"match_created\":false"));

    // The re-seed did not reset u1's debited balance.
    toteboard(&config)
        .args([
            "--json", "place", "--account", "u1", "--match", "m1", "--participant", "beta",
            "--amount", "70",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"balance\":\"0\""));
}

#[test]
fn placing_against_an_unknown_match_fails_loudly() {
    let (_dir, config) = workspace();
    toteboard(&config).args(["seed"]).assert().success();

    toteboard(&config)
        .args([
            "place", "--account", "u1", "--match", "nope", "--participant", "alpha",
            "--amount", "5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("match not found: nope"));
}

#[test]
fn an_overdrawn_stake_is_refused() {
    let (_dir, config) = workspace();
    toteboard(&config)
        .args(["seed", "--balance", "3"])
        .assert()
        .success();

    toteboard(&config)
        .args([
            "place", "--account", "u1", "--match", "m1", "--participant", "alpha",
            "--amount", "5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("insufficient balance"));
}

#[test]
fn a_completed_match_rejects_further_stakes() {
    let (_dir, config) = workspace();
    toteboard(&config).args(["seed"]).assert().success();
    toteboard(&config)
        .args(["result", "--match", "m1", "--status", "completed", "--score", "2:0"])
        .assert()
        .success();

    toteboard(&config)
        .args([
            "place", "--account", "u2", "--match", "m1", "--participant", "beta", "--amount",
            "5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("betting closed"));
}

#[test]
fn a_drawn_score_is_rejected_under_the_default_policy() {
    let (_dir, config) = workspace();
    toteboard(&config).args(["seed"]).assert().success();

    toteboard(&config)
        .args(["result", "--match", "m1", "--status", "completed", "--score", "1:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ambiguous winner"));
}

#[test]
fn an_invalid_config_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "[pricing]\nprior = 0\n").unwrap();

    toteboard(&config)
        .args(["board"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pricing.prior"));
}

#[test]
fn the_database_env_var_overrides_the_config_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let override_db = dir.path().join("elsewhere.db");

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_toteboard"));
    cmd.arg("--config")
        .arg(&config)
        .env("TOTEBOARD_DATABASE", override_db.to_string_lossy().as_ref())
        .args(["seed"])
        .assert()
        .success();

    assert!(override_db.exists());
    assert!(!dir.path().join("ledger.db").exists());
}

#[test]
fn the_board_is_empty_before_seeding() {
    let (_dir, config) = workspace();

    toteboard(&config)
        .args(["board"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no matches yet"));
}
