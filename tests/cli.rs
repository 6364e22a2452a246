use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn demo_cmd() -> Command {
    Command::cargo_bin("winport-demo").expect("binary exists")
}

#[test]
fn demo_help_prints_usage() {
    demo_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Opens a native window and logs its input events",
        ));
}

#[test]
fn list_keys_prints_names_without_a_display() {
    demo_cmd()
        .env_remove("DISPLAY")
        .arg("--list-keys")
        .assert()
        .success()
        .stdout(predicate::str::contains("LShift"))
        .stdout(predicate::str::contains("Left Shift"));
}

#[test]
fn invalid_bindings_are_rejected_before_opening() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(
        &path,
        "[input]\nclose_keys = [\"Escape\"]\nfullscreen_keys = [\"Esc\"]\n",
    )
    .unwrap();

    demo_cmd()
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate keybinding"));
}

#[test]
fn unparsable_config_reports_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "[window\n").unwrap();

    demo_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}

#[test]
fn dump_config_schema_prints_json() {
    Command::cargo_bin("dump_config_schema")
        .expect("binary exists")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"window\""))
        .stdout(predicate::str::contains("close_keys"));
}
