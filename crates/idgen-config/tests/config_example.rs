//! Example config tests for idgen-config.
// crates/idgen-config/tests/config_example.rs
// =============================================================================
// Module: Example Config Tests
// Description: Ensure the canonical example stays valid.
// Purpose: Keep `idgen config example` output in sync with the model.
// =============================================================================

mod common;

use common::TestResult;
use idgen_config::AuditSinkKind;
use idgen_config::IdgenConfig;
use idgen_config::config_toml_example;

#[test]
fn example_config_validates() -> TestResult {
    let config =
        IdgenConfig::from_toml_str(&config_toml_example()).map_err(|err| err.to_string())?;
    let names: Vec<&str> = config.oracles.iter().map(|oracle| oracle.name.as_str()).collect();
    if names != ["directory", "database", "lms", "groupware", "reserved"] {
        return Err(format!("unexpected oracle order: {}", names.join(",")));
    }
    if config.audit.sink != AuditSinkKind::File {
        return Err("example should use the file sink".to_string());
    }
    config.oracle_settings().map_err(|err| err.to_string())?;
    let scope = config.batch.reserved_scope().map_err(|err| err.to_string())?;
    if scope.len() == 2 { Ok(()) } else { Err("expected two reserved ids".to_string()) }
}
