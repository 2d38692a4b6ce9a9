use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_once_flag() {
    Command::cargo_bin("nowplay")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--once"));
}

#[test]
fn version_reports_package_version() {
    Command::cargo_bin("nowplay")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_flags_are_rejected() {
    Command::cargo_bin("nowplay")
        .unwrap()
        .arg("--shuffle")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--shuffle"));
}

#[cfg(target_os = "linux")]
#[test]
fn once_without_session_bus_reports_no_media() {
    let home = tempfile::tempdir().unwrap();
    Command::cargo_bin("nowplay")
        .unwrap()
        .arg("--once")
        .env_remove("DBUS_SESSION_BUS_ADDRESS")
        .env_remove("XDG_CONFIG_HOME")
        .env("XDG_RUNTIME_DIR", home.path().join("missing"))
        .env("HOME", home.path())
        .assert()
        .success()
        .stdout("No media currently playing.\n");
}
