// crates/idgen-config/src/config.rs
// ============================================================================
// Module: idgen Configuration
// Description: Configuration loading and validation for the allocator CLI.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: idgen-core, idgen-oracles, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! It names the existence oracles (in consultation order), the batch policy,
//! and the audit sink. Missing or invalid configuration fails closed: an
//! allocator is never built from a config that did not validate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use idgen_core::OracleFailurePolicy;
use idgen_core::RunScope;
use idgen_core::UserId;
use idgen_oracles::HttpLookupConfig;
use idgen_oracles::ListConfig;
use idgen_oracles::OracleSettings;
use idgen_oracles::SqlCountConfig;
use idgen_oracles::http::ID_PLACEHOLDER;
use idgen_oracles::http::validate_absent_statuses;
use idgen_oracles::sql::CANDIDATE_PARAM;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "idgen.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "IDGEN_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of configured oracles.
pub(crate) const MAX_ORACLES: usize = 16;
/// Maximum length of an oracle name.
pub(crate) const MAX_ORACLE_NAME_LENGTH: usize = 64;
/// Maximum pause between batch entries, in milliseconds.
pub(crate) const MAX_PAUSE_MS: u64 = 60_000;
/// Hard ceiling on roster size.
pub(crate) const MAX_ROSTER_ENTRIES: usize = 100_000;
/// Default roster size limit.
const DEFAULT_MAX_ROSTER_ENTRIES: usize = 10_000;
/// Default roster file size limit, in bytes.
const DEFAULT_MAX_ROSTER_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Root configuration for the `idgen` CLI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdgenConfig {
    /// Batch processing policy.
    #[serde(default)]
    pub batch: BatchConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Existence oracles, in consultation order.
    #[serde(default)]
    pub oracles: Vec<OracleConfig>,
}

impl IdgenConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.batch.validate()?;
        self.audit.validate()?;
        if self.oracles.is_empty() {
            return Err(ConfigError::Invalid("at least one oracle must be configured".to_string()));
        }
        if self.oracles.len() > MAX_ORACLES {
            return Err(ConfigError::Invalid(format!(
                "too many oracles: {} (max {MAX_ORACLES})",
                self.oracles.len()
            )));
        }
        let mut names = BTreeSet::new();
        for oracle in &self.oracles {
            oracle.validate()?;
            if !names.insert(oracle.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate oracle name: {}", oracle.name)));
            }
        }
        Ok(())
    }

    /// Returns typed oracle settings in consultation order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an oracle config table cannot be decoded.
    pub fn oracle_settings(&self) -> Result<Vec<(String, OracleSettings)>, ConfigError> {
        self.oracles.iter().map(|oracle| Ok((oracle.name.clone(), oracle.settings()?))).collect()
    }
}

// ============================================================================
// SECTION: Batch Config
// ============================================================================

/// Batch processing configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Reaction to oracle failures.
    #[serde(default)]
    pub on_oracle_failure: OracleFailurePolicy,
    /// Delay between consecutive people, in milliseconds.
    #[serde(default)]
    pub pause_ms: u64,
    /// Maximum number of roster entries accepted.
    #[serde(default = "default_max_roster_entries")]
    pub max_roster_entries: usize,
    /// Maximum roster file size, in bytes.
    #[serde(default = "default_max_roster_bytes")]
    pub max_roster_bytes: usize,
    /// Identifiers that must never be issued.
    #[serde(default)]
    pub reserved_ids: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            on_oracle_failure: OracleFailurePolicy::default(),
            pause_ms: 0,
            max_roster_entries: DEFAULT_MAX_ROSTER_ENTRIES,
            max_roster_bytes: DEFAULT_MAX_ROSTER_BYTES,
            reserved_ids: Vec::new(),
        }
    }
}

impl BatchConfig {
    /// Validates batch configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.pause_ms > MAX_PAUSE_MS {
            return Err(ConfigError::Invalid(format!(
                "batch.pause_ms must be at most {MAX_PAUSE_MS}"
            )));
        }
        if self.max_roster_entries == 0 || self.max_roster_entries > MAX_ROSTER_ENTRIES {
            return Err(ConfigError::Invalid(format!(
                "batch.max_roster_entries must be between 1 and {MAX_ROSTER_ENTRIES}"
            )));
        }
        if self.max_roster_bytes == 0 {
            return Err(ConfigError::Invalid("batch.max_roster_bytes must be positive".to_string()));
        }
        self.reserved_scope().map(|_| ())
    }

    /// Returns the reserved identifiers as a run scope seed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a reserved identifier is malformed.
    pub fn reserved_scope(&self) -> Result<RunScope, ConfigError> {
        self.reserved_ids
            .iter()
            .map(|raw| {
                UserId::parse(raw).map_err(|err| {
                    ConfigError::Invalid(format!("batch.reserved_ids entry {raw:?}: {err}"))
                })
            })
            .collect()
    }
}

/// Returns the default roster entry limit.
const fn default_max_roster_entries() -> usize {
    DEFAULT_MAX_ROSTER_ENTRIES
}

/// Returns the default roster byte limit.
const fn default_max_roster_bytes() -> usize {
    DEFAULT_MAX_ROSTER_BYTES
}

// ============================================================================
// SECTION: Audit Config
// ============================================================================

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Auditing disabled.
    None,
}

/// Audit logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Audit sink selection.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Emit an event for every rejected candidate.
    #[serde(default)]
    pub log_candidates: bool,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path is only valid for the file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Oracle Config
// ============================================================================

/// Oracle type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleType {
    /// HTTP directory lookup.
    Http,
    /// `SQLite` count query.
    Sql,
    /// Static identifier list.
    List,
}

/// One existence oracle entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OracleConfig {
    /// Oracle identifier used in audit events and errors.
    pub name: String,
    /// Oracle type.
    #[serde(rename = "type")]
    pub oracle_type: OracleType,
    /// Oracle-specific configuration table.
    #[serde(default)]
    pub config: Option<toml::Value>,
}

impl OracleConfig {
    /// Validates the oracle entry and its typed configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Invalid("oracle name is empty".to_string()));
        }
        if name.len() > MAX_ORACLE_NAME_LENGTH {
            return Err(ConfigError::Invalid(format!("oracle name too long: {name}")));
        }
        if !name.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-')
        {
            return Err(ConfigError::Invalid(format!(
                "oracle name must use [a-z0-9_-]: {name}"
            )));
        }
        match self.settings()? {
            OracleSettings::Http(config) => {
                if !config.url_template.contains(ID_PLACEHOLDER) {
                    return Err(self.invalid("url_template must contain {id}"));
                }
                validate_absent_statuses(&config.absent_statuses)
                    .map_err(|message| self.invalid(&message))?;
                if config.timeout_ms == 0 {
                    return Err(self.invalid("timeout_ms must be positive"));
                }
                if let Some(env_name) = &config.bearer_token_env
                    && env_name.trim().is_empty()
                {
                    return Err(self.invalid("bearer_token_env must be non-empty"));
                }
            }
            OracleSettings::Sql(config) => {
                validate_path_string(&format!("oracles.{name}.path"), &config.path)?;
                if !config.query.contains(CANDIDATE_PARAM) {
                    return Err(self.invalid("query must bind the candidate as ?1"));
                }
            }
            OracleSettings::List(config) => {
                validate_path_string(&format!("oracles.{name}.path"), &config.path)?;
            }
        }
        Ok(())
    }

    /// Decodes the oracle-specific configuration table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the table is missing or malformed.
    pub fn settings(&self) -> Result<OracleSettings, ConfigError> {
        let value = self.config.clone().ok_or_else(|| self.invalid("config table is required"))?;
        let settings = match self.oracle_type {
            OracleType::Http => OracleSettings::Http(self.decode::<HttpLookupConfig>(value)?),
            OracleType::Sql => OracleSettings::Sql(self.decode::<SqlCountConfig>(value)?),
            OracleType::List => OracleSettings::List(self.decode::<ListConfig>(value)?),
        };
        Ok(settings)
    }

    /// Deserializes the config table into a typed oracle config.
    fn decode<T: for<'de> Deserialize<'de>>(&self, value: toml::Value) -> Result<T, ConfigError> {
        value.try_into::<T>().map_err(|err| self.invalid(&err.to_string()))
    }

    /// Builds an invalid-config error scoped to this oracle.
    fn invalid(&self, message: &str) -> ConfigError {
        ConfigError::Invalid(format!("oracle {}: {message}", self.name))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path against length constraints.
fn validate_path_string(field: &str, path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}
