// crates/idgen-core/src/interfaces/mod.rs
// ============================================================================
// Module: idgen Interfaces
// Description: Backend-agnostic existence oracle interface.
// Purpose: Define the contract between the allocator and external systems.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! An existence oracle answers one question for one external system: is this
//! identifier already in use? The allocator composes several oracles and
//! never embeds system-specific logic. Implementations must fail closed: when
//! a system cannot answer, they return [`OracleError`] rather than guessing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::UserId;

// ============================================================================
// SECTION: Existence Oracle
// ============================================================================

/// Oracle errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - An error never means "absent" or "present".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The external system could not answer.
    #[error("oracle {oracle} unavailable: {message}")]
    Unavailable {
        /// Oracle identifier.
        oracle: String,
        /// Failure description.
        message: String,
    },
    /// The oracle could not be constructed from its configuration.
    #[error("oracle {oracle} misconfigured: {message}")]
    Misconfigured {
        /// Oracle identifier.
        oracle: String,
        /// Failure description.
        message: String,
    },
}

impl OracleError {
    /// Builds an [`OracleError::Unavailable`] for the given oracle.
    #[must_use]
    pub fn unavailable(oracle: &str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            oracle: oracle.to_string(),
            message: message.into(),
        }
    }

    /// Builds an [`OracleError::Misconfigured`] for the given oracle.
    #[must_use]
    pub fn misconfigured(oracle: &str, message: impl Into<String>) -> Self {
        Self::Misconfigured {
            oracle: oracle.to_string(),
            message: message.into(),
        }
    }

    /// Returns the identifier of the oracle that failed.
    #[must_use]
    pub fn oracle(&self) -> &str {
        match self {
            Self::Unavailable {
                oracle, ..
            }
            | Self::Misconfigured {
                oracle, ..
            } => oracle,
        }
    }
}

/// Read-only existence check against one external system.
pub trait ExistenceOracle {
    /// Stable identifier of the oracle (for example `directory` or `lms`).
    fn oracle_id(&self) -> &str;

    /// Returns true when the identifier already exists in the system.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] when the system cannot answer.
    fn exists(&self, candidate: &UserId) -> Result<bool, OracleError>;
}
