// crates/idgen-oracles/src/list.rs
// ============================================================================
// Module: List Oracle
// Description: Existence oracle backed by a static identifier list.
// Purpose: Block reserved, retired, or otherwise unissuable identifiers.
// Dependencies: idgen-core, serde
// ============================================================================

//! ## Overview
//! A list file holds one identifier per line. Blank lines and text after `#`
//! are ignored, and entries are lowercased. The file is read once at
//! construction under a size limit; lookups never touch the filesystem.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use idgen_core::ExistenceOracle;
use idgen_core::OracleError;
use idgen_core::UserId;
use serde::Deserialize;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default maximum list file size, in bytes.
const DEFAULT_MAX_BYTES: usize = 4 * 1024 * 1024;

/// Configuration for the list oracle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListConfig {
    /// Path to the newline-delimited identifier list.
    pub path: PathBuf,
    /// Maximum file size allowed, in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

/// Returns the default list size limit.
const fn default_max_bytes() -> usize {
    DEFAULT_MAX_BYTES
}

// ============================================================================
// SECTION: Oracle Implementation
// ============================================================================

/// Existence oracle answering membership in a fixed identifier set.
#[derive(Debug, Clone)]
pub struct ListOracle {
    /// Oracle identifier.
    oracle_id: String,
    /// Listed identifiers, lowercased.
    entries: BTreeSet<String>,
}

impl ListOracle {
    /// Loads the list file named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Misconfigured`] when the file cannot be read,
    /// exceeds the size limit, or is not UTF-8.
    pub fn load(oracle_id: impl Into<String>, config: &ListConfig) -> Result<Self, OracleError> {
        let oracle_id = oracle_id.into();
        let file = File::open(&config.path).map_err(|err| {
            OracleError::misconfigured(
                &oracle_id,
                format!("cannot open {}: {err}", config.path.display()),
            )
        })?;
        let limit = u64::try_from(config.max_bytes)
            .map_err(|_| OracleError::misconfigured(&oracle_id, "size limit exceeds u64"))?;
        let mut raw = String::new();
        file.take(limit.saturating_add(1))
            .read_to_string(&mut raw)
            .map_err(|err| OracleError::misconfigured(&oracle_id, err.to_string()))?;
        if raw.len() > config.max_bytes {
            return Err(OracleError::misconfigured(&oracle_id, "list file exceeds size limit"));
        }
        Ok(Self::from_entries(oracle_id, parse_entries(&raw)))
    }

    /// Builds a list oracle from in-memory entries.
    #[must_use]
    pub fn from_entries<I, S>(oracle_id: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            oracle_id: oracle_id.into(),
            entries: entries
                .into_iter()
                .map(|entry| entry.as_ref().trim().to_ascii_lowercase())
                .filter(|entry| !entry.is_empty())
                .collect(),
        }
    }

    /// Number of listed identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ExistenceOracle for ListOracle {
    fn oracle_id(&self) -> &str {
        &self.oracle_id
    }

    fn exists(&self, candidate: &UserId) -> Result<bool, OracleError> {
        Ok(self.entries.contains(candidate.as_str()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Splits list text into entries, dropping comments and blank lines.
fn parse_entries(raw: &str) -> Vec<&str> {
    raw.lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .collect()
}
