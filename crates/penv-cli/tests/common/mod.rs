#![allow(dead_code)]

use std::{fs, path::Path};

use assert_cmd::{assert::Assert, cargo::cargo_bin_cmd, Command};
use serde_json::Value;
use tempfile::TempDir;

pub fn project(prefix: &str) -> TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("tempdir")
}

pub fn penv(root: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("penv");
    cmd.current_dir(root)
        .env_remove("PENV_STRICT")
        .env("NO_COLOR", "1");
    cmd
}

pub fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write file");
}

pub fn parse_json(assert: &Assert) -> Value {
    let output = assert.get_output();
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "invalid json ({err}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}
