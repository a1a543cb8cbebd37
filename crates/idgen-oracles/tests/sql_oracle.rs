// crates/idgen-oracles/tests/sql_oracle.rs
// ============================================================================
// Module: SQL Count Oracle Tests
// Description: Count semantics and configuration checks against SQLite files.
// Purpose: Validate bound-parameter lookups and fail-closed construction.
// Dependencies: idgen-oracles, idgen-core, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! Builds a small accounts database in a temp directory and checks that the
//! oracle treats positive counts as present and everything else as absent.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::Path;
use std::path::PathBuf;

use idgen_core::ExistenceOracle;
use idgen_core::OracleError;
use idgen_core::UserId;
use idgen_oracles::SqlCountConfig;
use idgen_oracles::SqlCountOracle;
use rusqlite::Connection;
use tempfile::TempDir;

/// Creates `accounts.db` with a `people(login)` table holding `logins`.
fn accounts_db(dir: &TempDir, logins: &[&str]) -> PathBuf {
    let path = dir.path().join("accounts.db");
    let connection = Connection::open(&path).unwrap();
    connection.execute_batch("CREATE TABLE people (login TEXT NOT NULL);").unwrap();
    for login in logins {
        connection.execute("INSERT INTO people (login) VALUES (?1)", [login]).unwrap();
    }
    path
}

/// Builds a config for the given query.
fn config(path: &Path, query: &str) -> SqlCountConfig {
    SqlCountConfig {
        path: path.to_path_buf(),
        query: query.to_string(),
        busy_timeout_ms: 1_000,
    }
}

fn id(value: &str) -> UserId {
    UserId::parse(value).unwrap()
}

#[test]
fn positive_count_means_present() {
    let dir = tempfile::tempdir().unwrap();
    let path = accounts_db(&dir, &["smith", "smitha"]);
    let oracle = SqlCountOracle::new(
        "database",
        config(&path, "SELECT COUNT(*) FROM people WHERE lower(login) = ?1"),
    )
    .unwrap();

    assert_eq!(oracle.oracle_id(), "database");
    assert!(oracle.exists(&id("smith")).unwrap());
    assert!(oracle.exists(&id("smitha")).unwrap());
    assert!(!oracle.exists(&id("smith01")).unwrap());
}

#[test]
fn no_row_means_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = accounts_db(&dir, &["jones"]);
    let oracle =
        SqlCountOracle::new("lms", config(&path, "SELECT 1 FROM people WHERE login = ?1")).unwrap();

    assert!(oracle.exists(&id("jones")).unwrap());
    assert!(!oracle.exists(&id("smith")).unwrap());
}

#[test]
fn candidate_is_bound_not_interpolated() {
    let dir = tempfile::tempdir().unwrap();
    let path = accounts_db(&dir, &["x' OR '1'='1"]);
    let oracle = SqlCountOracle::new(
        "database",
        config(&path, "SELECT COUNT(*) FROM people WHERE login = ?1"),
    )
    .unwrap();
    assert!(!oracle.exists(&id("x")).unwrap());
}

#[test]
fn database_is_opened_read_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = accounts_db(&dir, &[]);
    let oracle = SqlCountOracle::new(
        "database",
        config(&path, "INSERT INTO people (login) VALUES (?1) RETURNING 1"),
    );
    match oracle {
        Ok(oracle) => assert!(matches!(
            oracle.exists(&id("smith")),
            Err(OracleError::Unavailable { .. })
        )),
        Err(err) => assert!(matches!(err, OracleError::Misconfigured { .. })),
    }
    let count: i64 = Connection::open(&path)
        .unwrap()
        .query_row("SELECT COUNT(*) FROM people", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn construction_rejects_bad_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let path = accounts_db(&dir, &[]);
    let cases = [
        config(&path, "SELECT COUNT(*) FROM people"),
        config(&path, "SELECT COUNT(*) FROM missing_table WHERE login = ?1"),
        config(&path, "SELECT COUNT(*) FROM people WHERE login = ?1 OR login = ?2"),
        config(&dir.path().join("absent.db"), "SELECT COUNT(*) FROM people WHERE login = ?1"),
    ];
    for case in cases {
        let result = SqlCountOracle::new("database", case);
        assert!(matches!(result, Err(OracleError::Misconfigured { .. })), "case should fail");
    }
}

#[test]
fn busy_timeout_defaults_when_omitted() {
    let parsed: SqlCountConfig = serde_json::from_value(serde_json::json!({
        "path": "/srv/hr.db",
        "query": "SELECT COUNT(*) FROM staff WHERE uid = ?1"
    }))
    .unwrap();
    assert_eq!(parsed.busy_timeout_ms, 5_000);
}
