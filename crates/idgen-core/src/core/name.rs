// crates/idgen-core/src/core/name.rs
// ============================================================================
// Module: Person Names
// Description: Raw person names and their normalized allocator form.
// Purpose: Centralize name normalization rules used by candidate generation.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Names arrive from rosters and HR extracts with punctuation, spaces, and
//! mixed case. Normalization keeps only ASCII letters and lowercases them, so
//! `"O'Brien-Smith"` becomes `"obriensmith"`. Both normalized parts must be
//! non-empty before any candidate can be generated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Person name as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    /// Given (first) name.
    pub given_name: String,
    /// Family (last) name.
    pub family_name: String,
}

impl PersonName {
    /// Creates a person name from given and family parts.
    #[must_use]
    pub fn new(given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        Self {
            given_name: given_name.into(),
            family_name: family_name.into(),
        }
    }

    /// Normalizes both parts of the name.
    ///
    /// # Errors
    ///
    /// Returns [`NameError`] when either part is empty after normalization.
    pub fn normalize(&self) -> Result<NormalizedName, NameError> {
        NormalizedName::from_parts(&self.given_name, &self.family_name)
    }
}

/// Normalized person name.
///
/// # Invariants
/// - `given` and `family` are non-empty.
/// - Both contain only lowercase ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    /// Normalized given name.
    given: String,
    /// Normalized family name.
    family: String,
}

impl NormalizedName {
    /// Normalizes raw given and family names.
    ///
    /// # Errors
    ///
    /// Returns [`NameError`] when either part is empty after normalization.
    pub fn from_parts(given: &str, family: &str) -> Result<Self, NameError> {
        let given = normalize_part(given);
        let family = normalize_part(family);
        if family.is_empty() {
            return Err(NameError::EmptyFamilyName);
        }
        if given.is_empty() {
            return Err(NameError::EmptyGivenName);
        }
        Ok(Self {
            given,
            family,
        })
    }

    /// Returns the normalized given name.
    #[must_use]
    pub fn given(&self) -> &str {
        &self.given
    }

    /// Returns the normalized family name.
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Returns the first `len` characters of the family name (or all of it).
    #[must_use]
    pub fn family_prefix(&self, len: usize) -> &str {
        &self.family[..self.family.len().min(len)]
    }

    /// Returns the given-name initial.
    #[must_use]
    pub fn initial(&self) -> &str {
        &self.given[..1]
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Name validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Given name contains no ASCII letters.
    #[error("given name has no letters after normalization")]
    EmptyGivenName,
    /// Family name contains no ASCII letters.
    #[error("family name has no letters after normalization")]
    EmptyFamilyName,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Keeps ASCII letters only, lowercased.
fn normalize_part(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphabetic).map(|ch| ch.to_ascii_lowercase()).collect()
}
