use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn gamesave(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gamesave").unwrap();
    cmd.env("GAMESAVE_CONFIG_DIR", temp.path().join("config"))
        .env_remove("GAMESAVE_LOG");
    cmd
}

/// A directory game "Quest" whose save holds `level 1`
fn add_quest(temp: &TempDir) -> PathBuf {
    let parent = temp.path().join("saves");
    let save = parent.join("QuestSave").join("slot1.sav");
    fs::create_dir_all(save.parent().unwrap()).unwrap();
    fs::write(&save, b"level 1").unwrap();

    gamesave(temp)
        .args(["game", "add", "Quest", "--game-dir", "QuestSave", "--parent"])
        .arg(&parent)
        .arg("--user")
        .arg(temp.path().join("backups"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Added game: Quest"));

    save
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_empty_game_list() {
    let temp = TempDir::new().unwrap();
    gamesave(&temp)
        .args(["game", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No games configured."));
}

#[test]
fn test_add_and_show_game() {
    let temp = TempDir::new().unwrap();
    add_quest(&temp);

    gamesave(&temp)
        .args(["game", "show", "quest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Game directory:   QuestSave"))
        .stdout(predicate::str::contains("Version format:   v000.00"));

    assert!(temp.path().join("config").join("games.json").exists());
}

#[test]
fn test_add_rejects_unknown_strategy() {
    let temp = TempDir::new().unwrap();
    gamesave(&temp)
        .args(["game", "add", "Cloud", "--parent", "a", "--user", "b", "--strategy", "cloud"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported backup strategy: cloud"));
}

#[test]
fn test_add_rejects_invalid_name_format() {
    let temp = TempDir::new().unwrap();
    gamesave(&temp)
        .args(["game", "add", "Quest", "--parent", "a", "--user", "b", "-g", "Quest"])
        .args(["--name-format", "D V D"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid name format"));
}

#[test]
fn test_backup_requires_a_game() {
    let temp = TempDir::new().unwrap();
    gamesave(&temp)
        .args(["backup", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("none selected"));
}

#[test]
fn test_backup_create_and_list() {
    let temp = TempDir::new().unwrap();
    add_quest(&temp);

    gamesave(&temp)
        .args(["backup", "create", "Start", "--game", "Quest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v000.00 Start"));

    gamesave(&temp)
        .args(["backup", "create", "--game", "Quest", "--", "-boss"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v000.01 Start -boss"));

    gamesave(&temp)
        .args(["backup", "list", "--game", "Quest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. ").and(predicate::str::contains("v000.01 Start -boss")))
        .stdout(predicate::str::contains("Total: 2 backup(s)"));
}

#[test]
fn test_restore_then_revert() {
    let temp = TempDir::new().unwrap();
    let save = add_quest(&temp);

    gamesave(&temp).args(["game", "select", "Quest"]).assert().success();
    gamesave(&temp).args(["backup", "create", "Start"]).assert().success();

    fs::write(&save, b"level 5").unwrap();

    gamesave(&temp)
        .args(["backup", "restore", "latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup is now:").and(predicate::str::contains("(01)")));
    assert_eq!(read(&save), "level 1");

    gamesave(&temp).args(["backup", "revert"]).assert().success();
    assert_eq!(read(&save), "level 5");

    gamesave(&temp)
        .args(["backup", "revert"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to revert"));
}

#[test]
fn test_restore_unknown_backup() {
    let temp = TempDir::new().unwrap();
    add_quest(&temp);

    gamesave(&temp)
        .args(["backup", "restore", "no such backup", "--game", "Quest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Backup not found"));
}

#[test]
fn test_delete_needs_force() {
    let temp = TempDir::new().unwrap();
    add_quest(&temp);
    gamesave(&temp).args(["game", "select", "Quest"]).assert().success();
    gamesave(&temp).args(["backup", "create", "Start"]).assert().success();

    gamesave(&temp)
        .args(["backup", "delete", "latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));

    gamesave(&temp)
        .args(["backup", "delete", "latest", "--force"])
        .assert()
        .success();

    gamesave(&temp)
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found"));
}

#[test]
fn test_quick_commands() {
    let temp = TempDir::new().unwrap();

    gamesave(&temp)
        .arg("quick-backup")
        .assert()
        .success()
        .stdout(predicate::str::contains("No game selected."));

    let save = add_quest(&temp);
    gamesave(&temp).args(["game", "select", "Quest"]).assert().success();
    gamesave(&temp).args(["backup", "create", "Start"]).assert().success();

    gamesave(&temp)
        .arg("quick-backup")
        .assert()
        .success()
        .stdout(predicate::str::contains("v000.01 Start"));

    fs::write(&save, b"level 9").unwrap();
    gamesave(&temp).arg("quick-restore").assert().success();
    assert_eq!(read(&save), "level 1");
}

#[test]
fn test_single_file_game() {
    let temp = TempDir::new().unwrap();
    let parent = temp.path().join("saves");
    fs::create_dir_all(&parent).unwrap();
    fs::write(parent.join("farm.sav"), b"day 1").unwrap();

    gamesave(&temp)
        .args(["game", "add", "Farm", "--strategy", "subordinate_user_file"])
        .args(["--save-file", "farm", "--extension", "sav", "--parent"])
        .arg(&parent)
        .arg("--user")
        .arg(temp.path().join("backups"))
        .assert()
        .success();

    gamesave(&temp)
        .args(["backup", "create", "Spring", "--game", "Farm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v000.00 Spring.sav"));
}

#[test]
fn test_monitor_mode_is_persisted() {
    let temp = TempDir::new().unwrap();
    add_quest(&temp);

    gamesave(&temp)
        .args(["monitor", "cycle", "--game", "Quest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("now Passive"));

    gamesave(&temp)
        .args(["monitor", "status", "--game", "Quest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode:            Passive"))
        .stdout(predicate::str::contains("Status:          Playing"));

    gamesave(&temp)
        .args(["monitor", "set", "loud", "--game", "Quest"])
        .assert()
        .failure();
}

#[test]
fn test_monitor_watch_when_off() {
    let temp = TempDir::new().unwrap();
    add_quest(&temp);

    gamesave(&temp)
        .args(["monitor", "watch", "--game", "Quest", "--seconds", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Monitoring is off"));
}

#[test]
fn test_watch_runs_for_the_given_time() {
    let temp = TempDir::new().unwrap();
    add_quest(&temp);
    gamesave(&temp).args(["monitor", "set", "active", "--game", "Quest"]).assert().success();

    gamesave(&temp)
        .args(["monitor", "watch", "--game", "Quest", "--seconds", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stopped watching Quest."));
}
