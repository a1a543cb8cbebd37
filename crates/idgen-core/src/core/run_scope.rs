// crates/idgen-core/src/core/run_scope.rs
// ============================================================================
// Module: Run Scope
// Description: Identifiers already issued within the current batch run.
// Purpose: Prevent two people in one batch from receiving the same identifier.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! External oracles only see committed state, so two people processed in the
//! same run can both look free for the same candidate. The [`RunScope`] is the
//! caller-owned record of identifiers handed out so far. The allocator reads it
//! but never writes it; the batch owner inserts each issued identifier before
//! the next allocation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::identifiers::UserId;

// ============================================================================
// SECTION: Run Scope
// ============================================================================

/// Identifiers already allocated during the current run.
///
/// # Invariants
/// - Entries are unique.
/// - Iteration order is lexicographic and stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RunScope {
    /// Issued identifiers.
    issued: BTreeSet<UserId>,
}

impl RunScope {
    /// Creates an empty run scope.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            issued: BTreeSet::new(),
        }
    }

    /// Records an issued identifier. Returns false if it was already present.
    pub fn insert(&mut self, user_id: UserId) -> bool {
        self.issued.insert(user_id)
    }

    /// Returns true when the identifier was already issued in this run.
    #[must_use]
    pub fn contains(&self, user_id: &UserId) -> bool {
        self.issued.contains(user_id)
    }

    /// Number of identifiers issued in this run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    /// Returns true when nothing has been issued yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    /// Iterates issued identifiers in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &UserId> {
        self.issued.iter()
    }
}

impl FromIterator<UserId> for RunScope {
    fn from_iter<I: IntoIterator<Item = UserId>>(iter: I) -> Self {
        Self {
            issued: iter.into_iter().collect(),
        }
    }
}
