//! Scenario: without `--config` the CLI resolves layers like the daemon.
//!
//! GREEN when:
//! - `config/default.yaml` in the working directory is read when neither
//!   `--config` nor LCF_CONFIG_PATHS is given.
//! - LCF_CONFIG_PATHS overrides the default file.
//!
//! The token env var named by the chosen layer is left unset on purpose, so
//! the command stops before any network call and its error names the layer's
//! variable.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn workdir_with_default(token_env: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("config")).unwrap();
    fs::write(
        dir.path().join("config/default.yaml"),
        format!("gateway:\n  api_token_env: {token_env}\n"),
    )
    .unwrap();
    dir
}

#[test]
fn invoice_show_reads_default_file() {
    let dir = workdir_with_default("LCF_CLI_TEST_TOKEN_FROM_DEFAULT_FILE");

    Command::cargo_bin("lcf")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("LCF_CONFIG_PATHS")
        .env_remove("LCF_CLI_TEST_TOKEN_FROM_DEFAULT_FILE")
        .args(["invoice", "show", "--id", "inv_1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("LCF_CLI_TEST_TOKEN_FROM_DEFAULT_FILE"));
}

#[test]
fn env_layers_override_default_file() {
    let dir = workdir_with_default("LCF_CLI_TEST_TOKEN_FROM_DEFAULT_FILE");
    fs::write(
        dir.path().join("site.yaml"),
        "gateway:\n  api_token_env: LCF_CLI_TEST_TOKEN_FROM_SITE_FILE\n",
    )
    .unwrap();

    Command::cargo_bin("lcf")
        .unwrap()
        .current_dir(dir.path())
        .env("LCF_CONFIG_PATHS", "config/default.yaml,site.yaml")
        .env_remove("LCF_CLI_TEST_TOKEN_FROM_SITE_FILE")
        .args(["invoice", "show", "--id", "inv_1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("LCF_CLI_TEST_TOKEN_FROM_SITE_FILE"));
}
