//! CLI regression tests for the `restroute` binary.
//!
//! These tests invoke the binary as a subprocess to catch regressions in flag
//! names, exit codes, and output formats that the library tests can't catch.
//!
//! Run with: `cargo test -p restroute-test`
//! Requires the `restroute` binary to be built first (`cargo build -p restroute-cli`).

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

use crate::fixtures;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns an assert_cmd Command wrapping the `restroute` binary.
fn restroute() -> Command {
    // cargo_bin is deprecated for custom build-dir setups; fine for standard workspace use.
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("restroute")
        .expect("restroute binary not found; run `cargo build -p restroute-cli` first");
    cmd.env_remove("RUST_LOG").env_remove("RESTROUTE_CONFIG");
    cmd
}

fn resolve_raw(args: &[&str]) -> String {
    let output = restroute()
        .arg("resolve")
        .args(args)
        .args(["--output", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    String::from_utf8(output).expect("stdout should be valid UTF-8")
}

fn resolve_json(args: &[&str]) -> serde_json::Value {
    serde_json::from_str(&resolve_raw(args)).expect("--output json should be valid JSON")
}

fn fixture(name: &str) -> String {
    fixtures().join(name).display().to_string()
}

// ---------------------------------------------------------------------------
// restroute resolve
// ---------------------------------------------------------------------------

#[test]
fn resolve_minimal_text_output() {
    restroute()
        .args(["resolve", "--file"])
        .arg(fixture("minimal.yml"))
        .assert()
        .success()
        .stdout(contains("items"))
        .stdout(contains("/items.{_format}"))
        .stdout(contains("1 route(s)"));
}

#[test]
fn resolve_applies_format_flags() {
    let v = resolve_json(&["--file", &fixture("minimal.yml"), "--formats", "json,xml"]);
    let items = &v["routes"]["items"];
    assert_eq!(items["path"], "/items.{_format}");
    assert_eq!(items["methods"], serde_json::json!(["GET"]));
    assert_eq!(items["requirements"]["_format"], "json|xml");
}

#[test]
fn resolve_without_format() {
    let v = resolve_json(&["--file", &fixture("minimal.yml"), "--no-include-format"]);
    assert_eq!(v["routes"]["items"]["path"], "/items");
    assert!(v["routes"]["items"].get("requirements").is_none());
}

#[test]
fn resolve_imports_with_config() {
    let raw = resolve_raw(&[
        "--file",
        &fixture("api/routing.yml"),
        "--config",
        &fixture("api/restroute.yaml"),
    ]);
    let v: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");

    // Routes are printed in resolution order.
    let position = |name: &str| raw.find(&format!("\"{}\":", name)).expect("route present");
    assert!(position("health") < position("api_list"));
    assert!(position("api_list") < position("api_show"));

    let show = &v["routes"]["api_show"];
    assert_eq!(show["path"], "/api/users/{id}.{_format}");
    assert_eq!(show["requirements"]["id"], "\\d+");
    assert_eq!(show["requirements"]["_format"], "json|xml");
    assert_eq!(show["defaults"]["_format"], "json");
    assert_eq!(show["defaults"]["_locale"], "en");
    assert_eq!(show["schemes"], serde_json::json!(["https"]));

    assert!(v["routes"]["health"].get("schemes").is_none());
    assert_eq!(v["resources"].as_array().map(|r| r.len()), Some(2));
}

#[test]
fn resolve_yaml_output() {
    restroute()
        .args(["resolve", "--file"])
        .arg(fixture("minimal.yml"))
        .args(["--output", "yaml"])
        .assert()
        .success()
        .stdout(contains("routes:"))
        .stdout(contains("/items.{_format}"));
}

#[test]
fn resolve_empty_document() {
    let v = resolve_json(&["--file", &fixture("empty.yml")]);
    assert!(v["routes"].as_object().map(|r| r.is_empty()).unwrap_or(false));
    assert_eq!(v["resources"].as_array().map(|r| r.len()), Some(1));
}

#[test]
fn resolve_unknown_output_format_exits_two() {
    restroute()
        .args(["resolve", "--file"])
        .arg(fixture("minimal.yml"))
        .args(["--output", "xml"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn resolve_wrong_type_tag_exits_two() {
    restroute()
        .args(["resolve", "--file"])
        .arg(fixture("minimal.yml"))
        .args(["--type", "annotation"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("not a REST routing document"));
}

#[test]
fn resolve_relative_to_search_path() {
    let v = resolve_json(&[
        "--file",
        "users.yml",
        "--path",
        &fixture("api"),
        "--no-include-format",
    ]);
    assert_eq!(v["routes"]["list"]["path"], "/users");
}

#[test]
fn resolve_working_directory_file_with_search_path() {
    let shared = TempDir::new().expect("tempdir");

    let output = restroute()
        .current_dir(fixtures().join("api"))
        .args(["resolve", "--file", "users.yml", "--no-include-format"])
        .arg("--path")
        .arg(shared.path())
        .args(["--output", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(v["routes"]["show"]["path"], "/users/{id}");
}

// ---------------------------------------------------------------------------
// restroute validate
// ---------------------------------------------------------------------------

#[test]
fn validate_valid_documents_exit_zero() {
    restroute()
        .args(["validate", "--verbose", "--file"])
        .arg(fixture("minimal.yml"))
        .arg(fixture("api/routing.yml"))
        .assert()
        .success()
        .stdout(contains("OK (1 routes)"))
        .stdout(contains("OK (3 routes)"));
}

#[test]
fn validate_ambiguous_definition_exits_one() {
    restroute()
        .args(["validate", "--file"])
        .arg(fixture("invalid-ambiguous.yml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E2005"));
}

#[test]
fn validate_unsupported_key_exits_one() {
    restroute()
        .args(["validate", "--file"])
        .arg(fixture("invalid-unsupported-key.yml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E2004"))
        .stderr(contains("controller"));
}

#[test]
fn validate_parse_error_exits_one() {
    restroute()
        .args(["validate", "--file"])
        .arg(fixture("invalid-parse-error.yml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E2001"));
}

#[test]
fn validate_missing_file_exits_three() {
    restroute()
        .args(["validate", "--file", "this-file-does-not-exist.yml"])
        .assert()
        .failure()
        .code(3)
        .stderr(contains("E2009"));
}

#[test]
fn validate_missing_import_exits_three() {
    restroute()
        .args(["validate", "--file"])
        .arg(fixture("import-missing.yml"))
        .assert()
        .failure()
        .code(3)
        .stderr(contains("E2010"))
        .stderr(contains("does-not-exist.yml"));
}

#[test]
fn validate_reports_every_file() {
    restroute()
        .args(["validate", "--file"])
        .arg(fixture("invalid-ambiguous.yml"))
        .arg(fixture("minimal.yml"))
        .assert()
        .failure()
        .code(1)
        .stdout(contains("minimal.yml - OK"));
}

#[test]
fn validate_bad_config_exits_two() {
    let dir = TempDir::new().expect("tempdir");
    let config = dir.path().join("restroute.yaml");
    std::fs::write(&config, "formats: [json\n").expect("write config");

    restroute()
        .args(["validate", "--file"])
        .arg(fixture("minimal.yml"))
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .code(2)
        .stderr(contains("E2016"));
}

#[test]
fn validate_circular_import_exits_one() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("a.yml"), "b:\n  resource: b.yml\n").expect("write a.yml");
    std::fs::write(dir.path().join("b.yml"), "a:\n  resource: a.yml\n").expect("write b.yml");

    restroute()
        .args(["validate", "--file"])
        .arg(dir.path().join("a.yml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E2013"));
}

#[test]
fn validate_io_failure_outranks_later_invalid_document() {
    restroute()
        .args(["validate", "--file", "this-file-does-not-exist.yml"])
        .arg(fixture("invalid-ambiguous.yml"))
        .assert()
        .failure()
        .code(3)
        .stderr(contains("E2009"))
        .stderr(contains("E2005"));
}

#[test]
fn validate_type_mismatch_still_reports_remaining_files() {
    restroute()
        .args(["validate", "--type", "rest", "--file", "routes.xml"])
        .arg(fixture("minimal.yml"))
        .assert()
        .failure()
        .code(2)
        .stderr(contains("not a REST routing document"))
        .stdout(contains("minimal.yml - OK"));
}

// ---------------------------------------------------------------------------
// Fixture sanity (library)
// ---------------------------------------------------------------------------

#[test]
fn fixtures_resolve_through_library() {
    let config = restroute::LoaderConfig::load(&fixtures().join("api/restroute.yaml"))
        .expect("fixture config should load");
    let loader = restroute::YamlRouteLoader::from_config(&config);
    let routes = loader
        .load(&fixture("api/routing.yml"))
        .expect("fixture should resolve");
    assert_eq!(routes.names(), vec!["health", "api_list", "api_show"]);
    assert_eq!(
        routes.get("health").map(|r| r.path.as_str()),
        Some("/health.{_format}")
    );
}
