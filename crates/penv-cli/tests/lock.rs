use std::path::Path;

use filetime::{set_file_mtime, FileTime};

mod common;

use common::{parse_json, penv, project, write};

fn stale_project(root: &Path) {
    write(root, "environment.yml", "name: demo\ndependencies:\n  - python\n");
    write(root, "conda-lock.yml", "# generated\n");
    set_file_mtime(root.join("environment.yml"), FileTime::from_unix_time(2_000, 0))
        .expect("set descriptor mtime");
    set_file_mtime(root.join("conda-lock.yml"), FileTime::from_unix_time(1_000, 0))
        .expect("set lock mtime");
}

#[test]
fn fresh_lock_passes() {
    let temp = project("penv-lock-fresh");
    stale_project(temp.path());
    set_file_mtime(temp.path().join("conda-lock.yml"), FileTime::from_unix_time(3_000, 0))
        .expect("set lock mtime");
    let payload = parse_json(&penv(temp.path()).args(["--json", "lock"]).assert().success());
    assert_eq!(payload["details"]["status"], "fresh");
    assert_eq!(payload["details"]["continued"], false);
}

#[test]
fn equal_mtimes_are_fresh() {
    let temp = project("penv-lock-equal");
    stale_project(temp.path());
    set_file_mtime(temp.path().join("conda-lock.yml"), FileTime::from_unix_time(2_000, 0))
        .expect("set lock mtime");
    let payload = parse_json(&penv(temp.path()).args(["--json", "lock"]).assert().success());
    assert_eq!(payload["details"]["status"], "fresh");
}

#[test]
fn stale_lock_continues_without_a_terminal() {
    let temp = project("penv-lock-stale");
    stale_project(temp.path());
    let payload = parse_json(&penv(temp.path()).args(["--json", "lock"]).assert().success());
    assert_eq!(payload["details"]["status"], "stale");
    assert_eq!(payload["details"]["continued"], true);
    assert!(payload["hint"]
        .as_str()
        .is_some_and(|hint| hint.contains("conda-lock -f environment.yml")));
}

#[test]
fn strict_mode_rejects_stale_lock() {
    let temp = project("penv-lock-strict");
    stale_project(temp.path());
    let assert = penv(temp.path())
        .args(["lock", "--strict"])
        .assert()
        .code(5);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("[PE401]"), "{stderr}");
    assert!(stderr.contains("conda-lock -f environment.yml"), "{stderr}");

    penv(temp.path())
        .env("PENV_STRICT", "1")
        .args(["lock"])
        .assert()
        .code(5);
    penv(temp.path())
        .env("PENV_STRICT", "0")
        .args(["lock"])
        .assert()
        .success();
}

#[test]
fn missing_lock_follows_the_same_policy() {
    let temp = project("penv-lock-missing");
    write(temp.path(), "environment.yml", "name: demo\n");
    let payload = parse_json(
        &penv(temp.path())
            .args(["--json", "--no-input", "lock"])
            .assert()
            .success(),
    );
    assert_eq!(payload["details"]["status"], "missing-lock");

    let assert = penv(temp.path())
        .args(["--json", "lock", "--strict"])
        .assert()
        .code(5);
    let payload = parse_json(&assert);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["code"], "PE400");
}

#[test]
fn venv_projects_skip_the_lock_check() {
    let temp = project("penv-lock-venv");
    write(temp.path(), "requirements.txt", "requests\n");
    let payload = parse_json(
        &penv(temp.path())
            .args(["--json", "lock", "--strict"])
            .assert()
            .success(),
    );
    assert_eq!(payload["details"]["backend"], "venv");
    assert!(payload["details"]["status"].is_null());
}
