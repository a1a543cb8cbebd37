//! Oracle config validation tests for idgen-config.
// crates/idgen-config/tests/oracle_validation.rs
// =============================================================================
// Module: Oracle Config Validation Tests
// Description: Validate oracle names, ordering, and typed config tables.
// Purpose: Ensure misconfigured oracles are rejected before any lookup runs.
// =============================================================================

mod common;

use common::TestResult;
use common::assert_invalid;
use idgen_config::IdgenConfig;
use idgen_config::OracleType;
use idgen_oracles::OracleSettings;

#[test]
fn at_least_one_oracle_is_required() -> TestResult {
    assert_invalid(IdgenConfig::from_toml_str(""), "at least one oracle must be configured")
}

#[test]
fn duplicate_oracle_names_are_rejected() -> TestResult {
    let toml = r#"
[[oracles]]
name = "reserved"
type = "list"
config = { path = "a.txt" }

[[oracles]]
name = "reserved"
type = "list"
config = { path = "b.txt" }
"#;
    assert_invalid(IdgenConfig::from_toml_str(toml), "duplicate oracle name: reserved")
}

#[test]
fn oracle_names_are_restricted() -> TestResult {
    let toml = r#"
[[oracles]]
name = "Directory Server"
type = "list"
config = { path = "a.txt" }
"#;
    assert_invalid(IdgenConfig::from_toml_str(toml), "oracle name must use [a-z0-9_-]")
}

#[test]
fn unknown_oracle_type_is_a_parse_error() -> TestResult {
    let toml = r#"
[[oracles]]
name = "directory"
type = "ldap"
config = { path = "a.txt" }
"#;
    assert_invalid(IdgenConfig::from_toml_str(toml), "config parse error")
}

#[test]
fn config_table_is_required() -> TestResult {
    let toml = r#"
[[oracles]]
name = "reserved"
type = "list"
"#;
    assert_invalid(IdgenConfig::from_toml_str(toml), "oracle reserved: config table is required")
}

#[test]
fn unknown_oracle_keys_are_rejected() -> TestResult {
    let toml = r#"
[[oracles]]
name = "reserved"
type = "list"
config = { path = "a.txt", recursive = true }
"#;
    assert_invalid(IdgenConfig::from_toml_str(toml), "oracle reserved:")
}

#[test]
fn http_template_requires_placeholder() -> TestResult {
    let toml = r#"
[[oracles]]
name = "directory"
type = "http"
config = { url_template = "https://directory.example.edu/users" }
"#;
    assert_invalid(IdgenConfig::from_toml_str(toml), "url_template must contain {id}")
}

#[test]
fn http_absent_statuses_must_be_client_errors() -> TestResult {
    for statuses in ["[200]", "[404, 503]", "[302]", "[500]"] {
        let toml = format!(
            r#"
[[oracles]]
name = "directory"
type = "http"
config = {{ url_template = "https://directory.example.edu/users/{{id}}", absent_statuses = {statuses} }}
"#
        );
        assert_invalid(IdgenConfig::from_toml_str(&toml), "absent_statuses must be 4xx codes")?;
    }
    let toml = r#"
[[oracles]]
name = "directory"
type = "http"
config = { url_template = "https://directory.example.edu/users/{id}", absent_statuses = [404, 410] }
"#;
    IdgenConfig::from_toml_str(toml).map(|_| ()).map_err(|err| err.to_string())
}

#[test]
fn sql_query_requires_candidate_parameter() -> TestResult {
    let toml = r#"
[[oracles]]
name = "database"
type = "sql"
config = { path = "accounts.db", query = "SELECT COUNT(*) FROM people" }
"#;
    assert_invalid(IdgenConfig::from_toml_str(toml), "query must bind the candidate as ?1")
}

#[test]
fn oracle_order_and_settings_are_preserved() -> TestResult {
    let toml = r#"
[[oracles]]
name = "directory"
type = "http"
config = { url_template = "https://directory.example.edu/users/{id}", result_pointer = "/entries" }

[[oracles]]
name = "database"
type = "sql"
config = { path = "accounts.db", query = "SELECT COUNT(*) FROM people WHERE login = ?1" }

[[oracles]]
name = "reserved"
type = "list"
config = { path = "reserved.txt" }
"#;
    let config = IdgenConfig::from_toml_str(toml).map_err(|err| err.to_string())?;
    let types: Vec<OracleType> = config.oracles.iter().map(|oracle| oracle.oracle_type).collect();
    if types != vec![OracleType::Http, OracleType::Sql, OracleType::List] {
        return Err("oracle order not preserved".to_string());
    }
    let settings = config.oracle_settings().map_err(|err| err.to_string())?;
    let names: Vec<&str> = settings.iter().map(|(name, _)| name.as_str()).collect();
    if names != vec!["directory", "database", "reserved"] {
        return Err(format!("unexpected names: {}", names.join(",")));
    }
    match &settings[0].1 {
        OracleSettings::Http(http) => {
            if http.result_pointer.as_deref() != Some("/entries") || http.timeout_ms != 5_000 {
                return Err("http defaults not applied".to_string());
            }
        }
        _ => return Err("expected http settings first".to_string()),
    }
    match &settings[1].1 {
        OracleSettings::Sql(sql) if sql.busy_timeout_ms == 5_000 => Ok(()),
        _ => Err("expected sql settings with default busy timeout".to_string()),
    }
}
