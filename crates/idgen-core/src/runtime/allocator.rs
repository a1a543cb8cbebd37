// crates/idgen-core/src/runtime/allocator.rs
// ============================================================================
// Module: Username Allocator
// Description: Bounded search for the first identifier no system has claimed.
// Purpose: Resolve identifier uniqueness across injected existence oracles.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! The allocator walks the [`CandidateSequence`] for a normalized name and
//! returns the first candidate that is absent from the run scope and from
//! every oracle. Checks short-circuit: the run scope is consulted first, then
//! oracles in registration order, stopping at the first "present".
//!
//! Invariants:
//! - The run scope is read, never written; callers record issued identifiers.
//! - Oracle errors propagate unchanged and stop the search immediately.
//! - The search is bounded by [`crate::CANDIDATE_SPACE_SIZE`]; exhaustion is an
//!   error, never a fabricated identifier.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::core::Candidate;
use crate::core::CandidateSequence;
use crate::core::NameError;
use crate::core::PersonName;
use crate::core::RunScope;
use crate::core::Tier;
use crate::core::UserId;
use crate::interfaces::ExistenceOracle;
use crate::interfaces::OracleError;
use crate::runtime::audit::AllocationAuditEvent;
use crate::runtime::audit::AllocationAuditEventParams;
use crate::runtime::audit::AllocationAuditSink;
use crate::runtime::audit::AllocationOutcome;
use crate::runtime::audit::CandidateAuditEvent;
use crate::runtime::audit::NoopAuditSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Holder label reported when the run scope already contains a candidate.
pub const RUN_SCOPE_HOLDER: &str = "run_scope";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Successful allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    /// Allocated identifier.
    pub user_id: UserId,
    /// Tier that produced the identifier.
    pub tier: Tier,
    /// Number of candidates examined, including the accepted one.
    pub candidates_checked: usize,
}

/// Allocation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// The name normalized to an empty given or family part.
    #[error("invalid name: {0}")]
    InvalidName(#[from] NameError),
    /// Every candidate in every tier is taken.
    #[error(
        "identifier space exhausted for family prefix {prefix} after {candidates_checked} \
         candidates"
    )]
    Exhausted {
        /// Four-character family prefix of the final tier.
        prefix: String,
        /// Number of candidates examined.
        candidates_checked: usize,
    },
    /// An oracle could not answer.
    #[error(transparent)]
    OracleUnavailable(#[from] OracleError),
}

impl AllocationError {
    /// Returns the audit outcome for this error.
    #[must_use]
    pub const fn outcome(&self) -> AllocationOutcome {
        match self {
            Self::InvalidName(_) => AllocationOutcome::InvalidName,
            Self::Exhausted {
                ..
            } => AllocationOutcome::Exhausted,
            Self::OracleUnavailable(_) => AllocationOutcome::OracleUnavailable,
        }
    }
}

// ============================================================================
// SECTION: Free Function
// ============================================================================

/// Allocates the first free identifier for `name`.
///
/// # Errors
///
/// Returns [`AllocationError`] when the name is invalid, the candidate space
/// is exhausted, or an oracle fails.
pub fn allocate(
    name: &PersonName,
    oracles: &[&dyn ExistenceOracle],
    run_scope: &RunScope,
) -> Result<UserId, AllocationError> {
    search(name, oracles, run_scope, &mut |_, _| {}).map(|allocation| allocation.user_id)
}

// ============================================================================
// SECTION: Allocator
// ============================================================================

/// Username allocator owning its oracles and audit sink.
///
/// # Invariants
/// - Oracles are consulted in the order supplied to [`UsernameAllocator::new`].
/// - Exactly one allocation audit event is recorded per call.
pub struct UsernameAllocator {
    /// Existence oracles in consultation order.
    oracles: Vec<Box<dyn ExistenceOracle + Send + Sync>>,
    /// Audit sink for allocation events.
    audit: Arc<dyn AllocationAuditSink>,
    /// Emit an event for every rejected candidate.
    audit_candidates: bool,
}

impl UsernameAllocator {
    /// Creates an allocator over the given oracles with auditing disabled.
    #[must_use]
    pub fn new(oracles: Vec<Box<dyn ExistenceOracle + Send + Sync>>) -> Self {
        Self {
            oracles,
            audit: Arc::new(NoopAuditSink),
            audit_candidates: false,
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AllocationAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Enables or disables per-candidate rejection events.
    #[must_use]
    pub const fn with_candidate_audit(mut self, enabled: bool) -> Self {
        self.audit_candidates = enabled;
        self
    }

    /// Returns oracle identifiers in consultation order.
    #[must_use]
    pub fn oracle_ids(&self) -> Vec<&str> {
        self.oracles.iter().map(|oracle| oracle.oracle_id()).collect()
    }

    /// Returns the audit sink used by this allocator.
    #[must_use]
    pub fn audit_sink(&self) -> &dyn AllocationAuditSink {
        self.audit.as_ref()
    }

    /// Allocates the first free identifier for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError`] when the name is invalid, the candidate
    /// space is exhausted, or an oracle fails.
    pub fn allocate(
        &self,
        name: &PersonName,
        run_scope: &RunScope,
    ) -> Result<Allocation, AllocationError> {
        self.allocate_for(None, name, run_scope)
    }

    /// Allocates an identifier and tags the audit event with `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError`] when the name is invalid, the candidate
    /// space is exhausted, or an oracle fails.
    pub fn allocate_for(
        &self,
        reference: Option<&str>,
        name: &PersonName,
        run_scope: &RunScope,
    ) -> Result<Allocation, AllocationError> {
        let oracles: Vec<&dyn ExistenceOracle> = self
            .oracles
            .iter()
            .map(|oracle| {
                let oracle: &dyn ExistenceOracle = &**oracle;
                oracle
            })
            .collect();
        let mut checked = 0usize;
        let mut on_rejected = |candidate: &Candidate, held_by: &str| {
            checked += 1;
            if self.audit_candidates {
                self.audit.record_candidate(&CandidateAuditEvent::new(
                    candidate.user_id.clone(),
                    candidate.tier,
                    held_by,
                ));
            }
        };
        let result = search(name, &oracles, run_scope, &mut on_rejected);
        self.audit.record_allocation(&allocation_event(reference, name, &result, checked));
        result
    }
}

// ============================================================================
// SECTION: Search
// ============================================================================

/// Walks the candidate space, reporting each rejection to `on_rejected`.
fn search(
    name: &PersonName,
    oracles: &[&dyn ExistenceOracle],
    run_scope: &RunScope,
    on_rejected: &mut dyn FnMut(&Candidate, &str),
) -> Result<Allocation, AllocationError> {
    let normalized = name.normalize()?;
    let prefix = normalized.family_prefix(Tier::FourDigit.prefix_len()).to_string();
    let mut candidates_checked = 0usize;
    for candidate in CandidateSequence::new(normalized) {
        candidates_checked += 1;
        match holder_of(&candidate.user_id, oracles, run_scope)? {
            Some(held_by) => on_rejected(&candidate, held_by),
            None => {
                return Ok(Allocation {
                    user_id: candidate.user_id,
                    tier: candidate.tier,
                    candidates_checked,
                });
            }
        }
    }
    Err(AllocationError::Exhausted {
        prefix,
        candidates_checked,
    })
}

/// Returns who holds the candidate, or `None` when every check reports absent.
fn holder_of<'a>(
    candidate: &UserId,
    oracles: &[&'a dyn ExistenceOracle],
    run_scope: &RunScope,
) -> Result<Option<&'a str>, OracleError> {
    if run_scope.contains(candidate) {
        return Ok(Some(RUN_SCOPE_HOLDER));
    }
    for &oracle in oracles {
        if oracle.exists(candidate)? {
            return Ok(Some(oracle.oracle_id()));
        }
    }
    Ok(None)
}

/// Builds the audit event for one allocation attempt.
fn allocation_event(
    reference: Option<&str>,
    name: &PersonName,
    result: &Result<Allocation, AllocationError>,
    rejected: usize,
) -> AllocationAuditEvent {
    let (outcome, user_id, tier, candidates_checked, oracle, error) = match result {
        Ok(allocation) => (
            AllocationOutcome::Allocated,
            Some(allocation.user_id.clone()),
            Some(allocation.tier),
            allocation.candidates_checked,
            None,
            None,
        ),
        Err(err) => {
            let oracle = match err {
                AllocationError::OracleUnavailable(inner) => Some(inner.oracle().to_string()),
                _ => None,
            };
            let checked = match err {
                AllocationError::Exhausted {
                    candidates_checked, ..
                } => *candidates_checked,
                AllocationError::OracleUnavailable(_) => rejected + 1,
                AllocationError::InvalidName(_) => 0,
            };
            (err.outcome(), None, None, checked, oracle, Some(err.to_string()))
        }
    };
    AllocationAuditEvent::new(AllocationAuditEventParams {
        reference: reference.map(str::to_string),
        given_name: name.given_name.clone(),
        family_name: name.family_name.clone(),
        outcome,
        user_id,
        tier,
        candidates_checked,
        oracle,
        error,
    })
}
