// crates/idgen-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for idgen-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use idgen_config::ConfigError;
use idgen_config::IdgenConfig;

/// Result type used by config tests.
pub type TestResult = Result<(), String>;

/// Minimal valid configuration with a single list oracle.
pub const MINIMAL_TOML: &str = r#"
[[oracles]]
name = "reserved"
type = "list"
config = { path = "/etc/idgen/reserved.txt" }
"#;

/// Parses a TOML string into an `IdgenConfig` without validation.
pub fn config_from_toml(toml_str: &str) -> Result<IdgenConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns the minimal valid config, unvalidated.
pub fn minimal_config() -> Result<IdgenConfig, String> {
    config_from_toml(MINIMAL_TOML).map_err(|err| err.to_string())
}

/// Asserts that `result` is an error whose message contains `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
