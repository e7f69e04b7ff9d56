use std::fs;

mod common;

use common::{parse_json, penv, project, write};

fn stderr_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stderr).into_owned()
}

#[test]
fn backend_defaults_to_venv_in_empty_project() {
    let temp = project("penv-backend-empty");
    let assert = penv(temp.path())
        .args(["--json", "backend"])
        .assert()
        .success();
    let payload = parse_json(&assert);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["details"]["backend"], "venv");
    assert_eq!(payload["details"]["source"], "default");
    assert_eq!(payload["details"]["decision"], "none");
}

#[test]
fn backend_is_detected_from_descriptor_files() {
    let temp = project("penv-backend-detect");
    write(temp.path(), "environment.yml", "name: demo\ndependencies:\n");
    let payload = parse_json(&penv(temp.path()).args(["--json", "backend"]).assert().success());
    assert_eq!(payload["details"]["backend"], "managed-environment");
    assert_eq!(payload["details"]["source"], "detected");

    let temp = project("penv-backend-pip");
    write(temp.path(), "requirements.txt", "requests\n");
    let payload = parse_json(&penv(temp.path()).args(["--json", "backend"]).assert().success());
    assert_eq!(payload["details"]["backend"], "venv");
}

#[test]
fn ambiguous_project_falls_back_to_venv_with_warning() {
    let temp = project("penv-backend-ambiguous");
    write(temp.path(), "environment.yml", "name: demo\n");
    write(temp.path(), "pyproject.toml", "[project]\nname = \"demo\"\n");
    let assert = penv(temp.path()).args(["--json", "backend"]).assert().success();
    let payload = parse_json(&assert);
    assert_eq!(payload["details"]["backend"], "venv");
    assert_eq!(payload["details"]["source"], "ambiguous-default");
    assert_eq!(payload["details"]["decision"], "ambiguous");
    assert!(payload["hint"].as_str().is_some());
    assert!(
        stderr_of(&assert).contains("both managed-environment and pip-style"),
        "missing ambiguity warning"
    );
}

#[test]
fn stored_backend_beats_detection_and_override_beats_both() {
    let temp = project("penv-backend-config");
    write(temp.path(), "environment.yml", "name: demo\n");
    write(temp.path(), ".penv/config", "backend: venv\n");
    let payload = parse_json(&penv(temp.path()).args(["--json", "backend"]).assert().success());
    assert_eq!(payload["details"]["backend"], "venv");
    assert_eq!(payload["details"]["source"], "config");

    let payload = parse_json(
        &penv(temp.path())
            .args(["--json", "backend", "--backend", "managed-environment"])
            .assert()
            .success(),
    );
    assert_eq!(payload["details"]["backend"], "managed-environment");
    assert_eq!(payload["details"]["source"], "override");

    let payload = parse_json(
        &penv(temp.path())
            .args(["--json", "backend", "--backend", "auto"])
            .assert()
            .success(),
    );
    assert_eq!(payload["details"]["source"], "config");
}

#[test]
fn invalid_backend_exits_with_backend_code() {
    let temp = project("penv-backend-invalid");
    let assert = penv(temp.path())
        .args(["backend", "--backend", "conda"])
        .assert()
        .code(3);
    let stderr = stderr_of(&assert);
    assert!(stderr.contains("[PE200]"), "{stderr}");
    assert!(stderr.contains("invalid backend 'conda'"), "{stderr}");

    write(temp.path(), ".penv/config", "backend: invalid_backend\n");
    penv(temp.path()).args(["backend"]).assert().code(3);
}

#[test]
fn name_is_sanitized_from_project_directory() {
    let temp = project("penv-name");
    let root = temp.path().join("My Cool Project!");
    fs::create_dir_all(&root).expect("create project");
    let payload = parse_json(&penv(&root).args(["--json", "name"]).assert().success());
    assert_eq!(payload["details"]["name"], "my-cool-project");
    assert_eq!(payload["details"]["source"], "directory");

    let root = temp.path().join("123project");
    fs::create_dir_all(&root).expect("create project");
    let payload = parse_json(&penv(&root).args(["--json", "name"]).assert().success());
    assert_eq!(payload["details"]["name"], "env-123project");
}

#[test]
fn name_prefers_config_then_descriptor() {
    let temp = project("penv-name-order");
    write(temp.path(), "environment.yml", "name: from-descriptor\n");
    let payload = parse_json(&penv(temp.path()).args(["--json", "name"]).assert().success());
    assert_eq!(payload["details"]["name"], "from-descriptor");

    write(temp.path(), ".penv/config", "managed_env:\n  name: from-config\n");
    let payload = parse_json(&penv(temp.path()).args(["--json", "name"]).assert().success());
    assert_eq!(payload["details"]["name"], "from-config");
    assert_eq!(payload["details"]["source"], "config");
}

#[test]
fn reserved_name_fails_check_but_resolves() {
    let temp = project("penv-name-reserved");
    write(temp.path(), "environment.yml", "name: base\n");
    penv(temp.path()).args(["name"]).assert().success();
    let assert = penv(temp.path()).args(["name", "--check"]).assert().code(4);
    assert!(stderr_of(&assert).contains("[PE301]"));
}

#[test]
fn project_flag_points_at_another_directory() {
    let temp = project("penv-project-flag");
    write(temp.path(), "proj/environment.yml", "name: elsewhere\n");
    let payload = parse_json(
        &penv(temp.path())
            .args(["--json", "-C", "proj", "name"])
            .assert()
            .success(),
    );
    assert_eq!(payload["details"]["name"], "elsewhere");

    penv(temp.path())
        .args(["-C", "missing", "name"])
        .assert()
        .code(1);
}
