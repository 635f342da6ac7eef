//! End-to-end tests for the `gbif` binary.
//!
//! Every command runs with a scrubbed environment: no GBIF credentials and a
//! temporary home directory, so a settings file on the developer's machine
//! cannot leak in.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Env {
    home: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
        }
    }

    fn gbif(&self) -> Command {
        let mut cmd = Command::cargo_bin("gbif").unwrap();
        cmd.env("HOME", self.home.path())
            .env_remove("XDG_CONFIG_HOME")
            .env_remove("GBIF_CONFIG")
            .env_remove("GBIF_USER")
            .env_remove("GBIF_PWD")
            .env_remove("GBIF_EMAIL")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Write a settings file and return its path.
    fn settings(&self, contents: &str) -> std::path::PathBuf {
        let path = self.home.path().join("settings.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }
}

fn settings_for(api_base: &str) -> String {
    format!("api_base = \"{}\"\ntimeout_secs = 2\n", api_base)
}

// =============================================================================
// Parsing and help
// =============================================================================

#[test]
fn no_arguments_prints_help() {
    Env::new()
        .gbif()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: gbif"))
        .stdout(predicate::str::contains("--count_year"));
}

#[test]
fn help_groups_companions_by_command() {
    Env::new()
        .gbif()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Search:"))
        .stdout(predicate::str::contains("Download:"));
}

#[test]
fn unknown_flag_exits_two() {
    Env::new().gbif().arg("--bogus").assert().code(2);
}

#[test]
fn invalid_choice_exits_two() {
    Env::new()
        .gbif()
        .args(["-s", "--sContinent", "atlantis"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("atlantis"));
}

#[test]
fn completions_are_printed() {
    Env::new()
        .gbif()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gbif"));
}

// =============================================================================
// Verbose
// =============================================================================

#[test]
fn verbose_dumps_arguments_and_exits_before_anything_else() {
    let env = Env::new();
    // A broken settings file proves settings are never read
    let broken = env.settings("api_base = [");

    env.gbif()
        .args(["-v", "-d", "-q", "country = PT", "-g", "--gKey", "42"])
        .env("GBIF_CONFIG", &broken)
        .assert()
        .success()
        .stdout(predicate::str::contains("gKey 42"))
        .stdout(predicate::str::contains("queries country = PT"))
        .stdout(predicate::str::contains("verbose true"));
}

// =============================================================================
// Usage and configuration errors
// =============================================================================

#[test]
fn missing_key_is_a_usage_message() {
    Env::new()
        .gbif()
        .arg("-g")
        .assert()
        .success()
        .stdout(" --gKey argument is required\n")
        .stderr("");
}

#[test]
fn legacy_alias_missing_year() {
    Env::new()
        .gbif()
        .arg("-cy")
        .assert()
        .success()
        .stdout(" --cYear argument is required\n");
}

#[test]
fn missing_credential_exits_one_naming_the_variable() {
    let env = Env::new();
    // Unreachable base: any network attempt would show up as a network error
    let settings = env.settings(&settings_for("http://127.0.0.1:1"));

    env.gbif()
        .args(["--config"])
        .arg(&settings)
        .args(["-d", "-q", "country = PT"])
        .env("GBIF_USER", "someone")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GBIF_PWD"))
        .stderr(predicate::str::contains("network").not())
        .stderr(predicate::function(|s: &str| s.lines().count() == 1));
}

#[test]
fn broken_settings_file_exits_one() {
    let env = Env::new();
    let settings = env.settings("timeout_secs = \"soon\"");

    env.gbif()
        .arg("--config")
        .arg(&settings)
        .args(["--count_schema"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error: "));
}

#[test]
fn settings_found_through_gbif_config() {
    let env = Env::new();
    let settings = env.settings("api_base = \"ftp://example.org\"");

    env.gbif()
        .env("GBIF_CONFIG", &settings)
        .arg("--count_schema")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("api_base"));
}

// =============================================================================
// Backend calls
// =============================================================================

#[test]
fn unreachable_backend_exits_one_with_one_line() {
    let env = Env::new();
    let settings = env.settings(&settings_for("http://127.0.0.1:1"));

    env.gbif()
        .arg("--config")
        .arg(&settings)
        .args(["-g", "--gKey", "123"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::starts_with("error: "))
        .stderr(predicate::function(|s: &str| s.lines().count() == 1));
}

fn run_blocking(env: &Env, settings: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = env.gbif();
    cmd.arg("--config").arg(settings).args(args);
    cmd.assert()
}

#[tokio::test(flavor = "multi_thread")]
async fn count_year_prints_backend_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/occurrence/counts/year"))
        .and(query_param("year", "2020"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"2020": 5})))
        .expect(2)
        .mount(&server)
        .await;

    let env = Env::new();
    let settings = env.settings(&settings_for(&server.uri()));

    let compact = tokio::task::block_in_place(|| {
        run_blocking(&env, &settings, &["--count_year", "--cYear", "2020"])
    });
    compact.success().stdout("{\"2020\":5}\n");

    let pretty = tokio::task::block_in_place(|| {
        run_blocking(&env, &settings, &["-cy", "--cYear", "2020", "-json"])
    });
    pretty.success().stdout("{\n  \"2020\": 5\n}\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn not_found_is_reported_on_stderr() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/occurrence/999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let env = Env::new();
    let settings = env.settings(&settings_for(&server.uri()));

    let assert =
        tokio::task::block_in_place(|| run_blocking(&env, &settings, &["-g", "--gKey", "999"]));
    assert
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("not found"))
        .stderr(predicate::str::contains("/occurrence/999"));
}
