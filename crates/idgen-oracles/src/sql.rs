// crates/idgen-oracles/src/sql.rs
// ============================================================================
// Module: SQL Count Oracle
// Description: Existence oracle backed by a read-only SQLite query.
// Purpose: Check HR, student, or LMS tables for an existing account name.
// Dependencies: idgen-core, rusqlite
// ============================================================================

//! ## Overview
//! The SQL count oracle runs one configured query with the candidate bound as
//! `?1`. The first column of the first row decides presence: a positive
//! integer means present; no row, `NULL`, or zero means absent. The database
//! is opened read-only and the candidate is always bound, never formatted into
//! the SQL text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use idgen_core::ExistenceOracle;
use idgen_core::OracleError;
use idgen_core::UserId;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout for oracle connections.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Parameter the query must bind the candidate to.
pub const CANDIDATE_PARAM: &str = "?1";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the SQL count oracle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqlCountConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Query returning a count (or any integer) for the candidate bound as `?1`.
    pub query: String,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// Returns the default busy timeout for oracle connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Oracle Implementation
// ============================================================================

/// Existence oracle running a bound count query.
pub struct SqlCountOracle {
    /// Oracle identifier.
    oracle_id: String,
    /// Query text with a single `?1` parameter.
    query: String,
    /// Read-only connection guarded by a mutex.
    connection: Mutex<Connection>,
}

impl SqlCountOracle {
    /// Opens the database read-only and validates the query.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Misconfigured`] when the query is malformed or
    /// the database cannot be opened.
    pub fn new(oracle_id: impl Into<String>, config: SqlCountConfig) -> Result<Self, OracleError> {
        let oracle_id = oracle_id.into();
        if !config.query.contains(CANDIDATE_PARAM) {
            return Err(OracleError::misconfigured(
                &oracle_id,
                "query must bind the candidate as ?1",
            ));
        }
        if !config.path.is_file() {
            return Err(OracleError::misconfigured(
                &oracle_id,
                format!("database not found: {}", config.path.display()),
            ));
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let connection = Connection::open_with_flags(&config.path, flags)
            .map_err(|err| OracleError::misconfigured(&oracle_id, err.to_string()))?;
        connection
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(|err| OracleError::misconfigured(&oracle_id, err.to_string()))?;
        {
            let statement = connection
                .prepare(&config.query)
                .map_err(|err| OracleError::misconfigured(&oracle_id, err.to_string()))?;
            if statement.parameter_count() != 1 {
                return Err(OracleError::misconfigured(
                    &oracle_id,
                    "query must have exactly one parameter",
                ));
            }
            if statement.column_count() == 0 {
                return Err(OracleError::misconfigured(&oracle_id, "query must return a column"));
            }
        }
        Ok(Self {
            oracle_id,
            query: config.query,
            connection: Mutex::new(connection),
        })
    }
}

impl ExistenceOracle for SqlCountOracle {
    fn oracle_id(&self) -> &str {
        &self.oracle_id
    }

    fn exists(&self, candidate: &UserId) -> Result<bool, OracleError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| OracleError::unavailable(&self.oracle_id, "connection lock poisoned"))?;
        let mut statement = guard
            .prepare(&self.query)
            .map_err(|err| OracleError::unavailable(&self.oracle_id, err.to_string()))?;
        let count: Option<Option<i64>> = statement
            .query_row(params![candidate.as_str()], |row| row.get(0))
            .optional()
            .map_err(|err| OracleError::unavailable(&self.oracle_id, err.to_string()))?;
        Ok(count.flatten().is_some_and(|count| count > 0))
    }
}
