// crates/subvalidation-cli/tests/read_commands.rs
// ============================================================================
// Module: CLI Read Command Tests
// Description: Integration tests for CLI read workflows.
// Purpose: Ensure reads print JSON and failures exit non-zero.
// Dependencies: subvalidation-cli binary, subvalidation-store-sqlite
// ============================================================================

//! ## Overview
//! Runs the CLI binary against a seeded `SQLite` store and checks the JSON it
//! prints, plus fail-closed behavior for bad config and unknown tenants.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use rusqlite::Connection;
use serde_json::Value;
use subvalidation_store_sqlite::REFERENCE_SCHEMA;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const SEED_SQL: &str = "
INSERT INTO AM_SUBSCRIBER VALUES (1, 'admin', -1234);
INSERT INTO AM_SUBSCRIBER VALUES (2, 'alice@wso2.com', 1);
INSERT INTO AM_APPLICATION VALUES (1, 'DefaultApplication', 1, 'Unlimited', 'JWT');
INSERT INTO AM_APPLICATION VALUES (2, 'AliceApp', 2, '50PerMin', NULL);
INSERT INTO AM_APPLICATION_ATTRIBUTES VALUES (1, 'owner', 'ops', -1234);
INSERT INTO AM_API VALUES (1, 'admin', 'PizzaShack', '1.0.0', '/pizzashack/1.0.0', 'Unlimited');
INSERT INTO AM_API VALUES (2, 'alice@wso2.com', 'Weather', '1.0', '/t/wso2.com/weather/1.0', NULL);
INSERT INTO AM_API_URL_MAPPING VALUES (1, 1, 'GET', 'Any', '/menu', 'Unlimited');
INSERT INTO AM_API_URL_MAPPING VALUES (2, 1, 'POST', 'Any', '/order', 'Gold');
INSERT INTO AM_API_URL_MAPPING VALUES (3, 2, 'GET', 'Any', '/today', NULL);
INSERT INTO AM_APPLICATION_KEY_MAPPING VALUES (1, 'ck-admin', 'PRODUCTION');
INSERT INTO AM_POLICY_APPLICATION VALUES (1, '50PerMin', 'requestCount', 1);
";

fn subvalidation_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_subvalidation"))
}

/// Writes a seeded database and a config pointing at it.
fn fixture() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("apim.db");
    let connection = Connection::open(&db_path).expect("open db");
    connection.execute_batch(REFERENCE_SCHEMA).expect("schema");
    connection.execute_batch(SEED_SQL).expect("seed");
    drop(connection);

    let config_path = dir.path().join("subvalidation.toml");
    let config = format!(
        "[store]\npath = {:?}\n\n[logging]\nsink = \"none\"\n\n[[tenancy.tenants]]\ndomain = \
         \"wso2.com\"\nid = 1\n",
        db_path.display().to_string()
    );
    fs::write(&config_path, config).expect("write config");
    (dir, config_path)
}

fn run(config: &Path, args: &[&str]) -> Output {
    Command::new(subvalidation_bin())
        .args(args)
        .args(["--config", config.to_string_lossy().as_ref()])
        .output()
        .expect("run subvalidation")
}

fn stdout_json(output: &Output) -> Value {
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies config validation reports success.
#[test]
fn cli_config_validate_accepts_valid_config() {
    let (_dir, config) = fixture();
    let output = run(&config, &["config", "validate"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("config valid"));
}

/// Verifies API listing aggregates URL mappings per API.
#[test]
fn cli_apis_prints_aggregated_json() {
    let (_dir, config) = fixture();
    let apis = stdout_json(&run(&config, &["apis"]));
    let apis = apis.as_array().expect("array");
    assert_eq!(apis.len(), 2);
    assert_eq!(apis[0]["name"], "PizzaShack");
    assert_eq!(apis[0]["resources"].as_array().map(Vec::len), Some(2));
}

/// Verifies tenant filtering selects tenant contexts only.
#[test]
fn cli_apis_filters_by_tenant() {
    let (_dir, config) = fixture();
    let apis = stdout_json(&run(&config, &["apis", "--tenant", "wso2.com"]));
    let names: Vec<&str> =
        apis.as_array().expect("array").iter().filter_map(|api| api["name"].as_str()).collect();
    assert_eq!(names, vec!["Weather"]);
}

/// Verifies wildcard characters in a tenant filter match nothing.
#[test]
fn cli_apis_tenant_wildcards_match_literally() {
    let (_dir, config) = fixture();
    let apis = stdout_json(&run(&config, &["apis", "--tenant", "%"]));
    assert_eq!(apis.as_array().map(Vec::len), Some(0));
}

/// Verifies single lookups print null when nothing matches.
#[test]
fn cli_lookup_prints_null_for_missing_entity() {
    let (_dir, config) = fixture();
    let found = stdout_json(&run(&config, &["key-mapping", "--consumer-key", "ck-admin"]));
    assert_eq!(found["key_type"], "PRODUCTION");
    let missing = stdout_json(&run(&config, &["application", "--app-id", "99"]));
    assert!(missing.is_null());
}

/// Verifies URL mappings resolve the tenant domain to its id.
#[test]
fn cli_url_mappings_resolve_tenant_id() {
    let (_dir, config) = fixture();
    let mappings = stdout_json(&run(&config, &["url-mappings", "--tenant", "wso2.com"]));
    let patterns: Vec<&str> = mappings
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|mapping| mapping["url_pattern"].as_str())
        .collect();
    assert_eq!(patterns, vec!["/today"]);
}

/// Verifies unknown tenants fail closed instead of printing empty data.
#[test]
fn cli_unknown_tenant_fails_closed() {
    let (_dir, config) = fixture();
    let output = run(&config, &["applications", "--tenant", "unknown.org"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("tenant_resolution"), "unexpected stderr: {stderr}");
}

/// Verifies URL mapping lookups report unknown tenants like other reads.
#[test]
fn cli_url_mappings_unknown_tenant_reports_resolution_kind() {
    let (_dir, config) = fixture();
    let output = run(&config, &["url-mappings", "--tenant", "unknown.org"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("read failed (tenant_resolution)"), "unexpected stderr: {stderr}");
}

/// Verifies a missing config file fails with a clear error.
#[test]
fn cli_missing_config_fails() {
    let dir = TempDir::new().expect("temp dir");
    let output = run(&dir.path().join("absent.toml"), &["apis"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load config"));
}
