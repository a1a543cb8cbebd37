// crates/idgen-core/src/core/candidates.rs
// ============================================================================
// Module: Candidate Generation
// Description: Ordered candidate identifiers derived from a normalized name.
// Purpose: Define the six naming tiers and the deterministic search order.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Candidates are generated in a fixed order from the normalized family name
//! and the given-name initial:
//!
//! | Tier | Shape | Range |
//! |------|-------|-------|
//! | 1 | family\[..8\] | - |
//! | 2 | family\[..7\] + initial | - |
//! | 3 | family\[..6\] + `0n` | 01-09 |
//! | 4 | family\[..6\] + `nn` | 10-99 |
//! | 5 | family\[..5\] + `nnn` | 100-999 |
//! | 6 | family\[..4\] + `nnnn` | 1000-9999 |
//!
//! Shorter family names are used whole. Numbers ascend within a tier and the
//! sequence ends after tier 6; there is no further fallback.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::iter::FusedIterator;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::UserId;
use crate::core::name::NormalizedName;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Total number of candidates across all tiers for any name.
pub const CANDIDATE_SPACE_SIZE: usize = 1 + 1 + 9 + 90 + 900 + 9_000;

// ============================================================================
// SECTION: Tiers
// ============================================================================

/// Candidate generation tier, in search order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// First 8 characters of the family name.
    Truncated,
    /// First 7 characters of the family name plus the given-name initial.
    WithInitial,
    /// First 6 characters of the family name plus `01`-`09`.
    SingleDigit,
    /// First 6 characters of the family name plus `10`-`99`.
    TwoDigit,
    /// First 5 characters of the family name plus `100`-`999`.
    ThreeDigit,
    /// First 4 characters of the family name plus `1000`-`9999`.
    FourDigit,
}

impl Tier {
    /// All tiers in search order.
    pub const ALL: [Self; 6] = [
        Self::Truncated,
        Self::WithInitial,
        Self::SingleDigit,
        Self::TwoDigit,
        Self::ThreeDigit,
        Self::FourDigit,
    ];

    /// Returns the 1-based tier number.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Truncated => 1,
            Self::WithInitial => 2,
            Self::SingleDigit => 3,
            Self::TwoDigit => 4,
            Self::ThreeDigit => 5,
            Self::FourDigit => 6,
        }
    }

    /// Returns how many family-name characters the tier keeps.
    #[must_use]
    pub const fn prefix_len(self) -> usize {
        match self {
            Self::Truncated => 8,
            Self::WithInitial => 7,
            Self::SingleDigit | Self::TwoDigit => 6,
            Self::ThreeDigit => 5,
            Self::FourDigit => 4,
        }
    }

    /// Returns the inclusive numeric suffix range, if the tier is numeric.
    #[must_use]
    pub const fn number_range(self) -> Option<(u16, u16)> {
        match self {
            Self::Truncated | Self::WithInitial => None,
            Self::SingleDigit => Some((1, 9)),
            Self::TwoDigit => Some((10, 99)),
            Self::ThreeDigit => Some((100, 999)),
            Self::FourDigit => Some((1_000, 9_999)),
        }
    }

    /// Returns the zero-padded width of the numeric suffix.
    #[must_use]
    pub const fn suffix_width(self) -> usize {
        match self {
            Self::Truncated | Self::WithInitial => 0,
            Self::SingleDigit | Self::TwoDigit => 2,
            Self::ThreeDigit => 3,
            Self::FourDigit => 4,
        }
    }

    /// Returns the tier searched after this one.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Truncated => Some(Self::WithInitial),
            Self::WithInitial => Some(Self::SingleDigit),
            Self::SingleDigit => Some(Self::TwoDigit),
            Self::TwoDigit => Some(Self::ThreeDigit),
            Self::ThreeDigit => Some(Self::FourDigit),
            Self::FourDigit => None,
        }
    }
}

// ============================================================================
// SECTION: Candidates
// ============================================================================

/// Candidate identifier together with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Candidate identifier.
    pub user_id: UserId,
    /// Tier that produced the candidate.
    pub tier: Tier,
}

/// Iterator over every candidate for a name, in search order.
///
/// # Invariants
/// - Yields exactly [`CANDIDATE_SPACE_SIZE`] candidates, then ends.
/// - Numbers ascend within each numeric tier.
#[derive(Debug, Clone)]
pub struct CandidateSequence {
    /// Name the candidates are derived from.
    name: NormalizedName,
    /// Tier currently being generated; `None` once exhausted.
    tier: Option<Tier>,
    /// Next suffix within the current numeric tier.
    number: Option<u16>,
}

impl CandidateSequence {
    /// Creates a sequence positioned at the first tier.
    #[must_use]
    pub const fn new(name: NormalizedName) -> Self {
        Self {
            name,
            tier: Some(Tier::Truncated),
            number: None,
        }
    }
}

impl Iterator for CandidateSequence {
    type Item = Candidate;

    fn next(&mut self) -> Option<Self::Item> {
        let tier = self.tier?;
        let prefix = self.name.family_prefix(tier.prefix_len());
        let (value, tier_done) = match tier.number_range() {
            None if tier == Tier::WithInitial => (format!("{prefix}{}", self.name.initial()), true),
            None => (prefix.to_string(), true),
            Some((start, end)) => {
                let current = self.number.unwrap_or(start);
                let value = format!("{prefix}{current:0width$}", width = tier.suffix_width());
                if current >= end {
                    (value, true)
                } else {
                    self.number = Some(current + 1);
                    (value, false)
                }
            }
        };
        if tier_done {
            self.tier = tier.next();
            self.number = None;
        }
        Some(Candidate {
            user_id: UserId::from_generated(value),
            tier,
        })
    }
}

impl FusedIterator for CandidateSequence {}
