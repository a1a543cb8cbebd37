// crates/idgen-core/src/core/identifiers.rs
// ============================================================================
// Module: Login Identifiers
// Description: Canonical login identifier type issued by the allocator.
// Purpose: Provide a validated, serializable identifier with a stable wire form.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`UserId`] is the account name handed to downstream provisioning. It is
//! always lowercase ASCII letters and digits, at most
//! [`MAX_USER_ID_LENGTH`] characters. Identifiers produced by the candidate
//! generator satisfy these rules by construction; identifiers read from
//! external input go through [`UserId::parse`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a login identifier.
pub const MAX_USER_ID_LENGTH: usize = 8;

// ============================================================================
// SECTION: Identifier Type
// ============================================================================

/// Login identifier.
///
/// # Invariants
/// - Non-empty, at most [`MAX_USER_ID_LENGTH`] characters.
/// - Contains only lowercase ASCII letters and ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Parses an identifier from external input.
    ///
    /// # Errors
    ///
    /// Returns [`UserIdError`] when the value violates identifier invariants.
    pub fn parse(value: &str) -> Result<Self, UserIdError> {
        if value.is_empty() {
            return Err(UserIdError::Empty);
        }
        if value.len() > MAX_USER_ID_LENGTH {
            return Err(UserIdError::TooLong {
                length: value.len(),
                max: MAX_USER_ID_LENGTH,
            });
        }
        if let Some(bad) =
            value.chars().find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit()))
        {
            return Err(UserIdError::InvalidCharacter(bad));
        }
        Ok(Self(value.to_string()))
    }

    /// Builds an identifier from generator output that is valid by construction.
    pub(crate) const fn from_generated(value: String) -> Self {
        Self(value)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identifier validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserIdError {
    /// Identifier is empty.
    #[error("user id is empty")]
    Empty,
    /// Identifier exceeds the maximum length.
    #[error("user id is {length} characters (max {max})")]
    TooLong {
        /// Actual identifier length.
        length: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// Identifier contains a character outside `[a-z0-9]`.
    #[error("user id contains invalid character {0:?}")]
    InvalidCharacter(char),
}
