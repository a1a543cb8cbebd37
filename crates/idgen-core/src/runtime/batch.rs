// crates/idgen-core/src/runtime/batch.rs
// ============================================================================
// Module: Batch Allocation
// Description: Sequential allocation over a roster with a shared run scope.
// Purpose: Own the run scope and apply per-person failure policy.
// Dependencies: crate::{core, runtime}, serde
// ============================================================================

//! ## Overview
//! A batch processes people strictly in roster order. Each issued identifier
//! is recorded in the batch's [`RunScope`] before the next person is
//! attempted, so two people in one roster never share an identifier even
//! though no oracle has seen the first allocation yet.
//!
//! Invalid names and exhausted candidate spaces are recorded per person and
//! the batch continues. Oracle failures follow [`OracleFailurePolicy`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::core::PersonName;
use crate::core::RunScope;
use crate::core::Tier;
use crate::core::UserId;
use crate::runtime::allocator::AllocationError;
use crate::runtime::allocator::UsernameAllocator;
use crate::runtime::audit::AllocationOutcome;
use crate::runtime::audit::BatchAuditEvent;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One person to allocate an identifier for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Caller-supplied reference carried through to the report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Name to derive the identifier from.
    #[serde(flatten)]
    pub name: PersonName,
}

impl BatchRequest {
    /// Creates a request without a reference.
    #[must_use]
    pub const fn new(name: PersonName) -> Self {
        Self {
            reference: None,
            name,
        }
    }

    /// Attaches a reference to the request.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// How a batch reacts when an oracle cannot answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleFailurePolicy {
    /// Stop the batch; remaining people are not attempted.
    #[default]
    Abort,
    /// Record the failure for this person and continue.
    Skip,
}

/// Per-person batch result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEntryStatus {
    /// An identifier was issued.
    Allocated {
        /// Issued identifier.
        user_id: UserId,
        /// Tier that produced the identifier.
        tier: Tier,
        /// Candidates examined.
        candidates_checked: usize,
    },
    /// No identifier was issued.
    Failed {
        /// Failure classification.
        outcome: AllocationOutcome,
        /// Failure description.
        error: String,
    },
}

/// Batch report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    /// Caller-supplied reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Given name as supplied.
    pub given_name: String,
    /// Family name as supplied.
    pub family_name: String,
    /// Allocation result.
    #[serde(flatten)]
    pub status: BatchEntryStatus,
}

impl BatchEntry {
    /// Returns the issued identifier, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        match &self.status {
            BatchEntryStatus::Allocated {
                user_id, ..
            } => Some(user_id),
            BatchEntryStatus::Failed {
                ..
            } => None,
        }
    }
}

/// Batch outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Rows for every attempted person, in roster order.
    pub entries: Vec<BatchEntry>,
    /// People never attempted because the batch aborted.
    pub not_attempted: usize,
    /// Abort reason, when an oracle failure stopped the batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl BatchReport {
    /// Number of identifiers issued.
    #[must_use]
    pub fn allocated_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.user_id().is_some()).count()
    }

    /// Number of attempted people without an identifier.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.entries.len() - self.allocated_count()
    }

    /// Returns true when every person in the roster received an identifier.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none() && self.not_attempted == 0 && self.failed_count() == 0
    }
}

// ============================================================================
// SECTION: Batch Allocator
// ============================================================================

/// Batch driver owning the run scope for one roster.
///
/// # Invariants
/// - People are processed sequentially in input order.
/// - Every issued identifier enters the run scope before the next attempt.
#[derive(Debug, Clone, Default)]
pub struct BatchAllocator {
    /// Oracle failure policy.
    policy: OracleFailurePolicy,
    /// Delay between consecutive people.
    pause: Duration,
    /// Identifiers treated as taken before the first person.
    reserved: RunScope,
}

impl BatchAllocator {
    /// Creates a batch driver with the given oracle failure policy.
    #[must_use]
    pub fn new(policy: OracleFailurePolicy) -> Self {
        Self {
            policy,
            pause: Duration::ZERO,
            reserved: RunScope::new(),
        }
    }

    /// Sets the delay between consecutive people.
    #[must_use]
    pub const fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Seeds the run scope with identifiers that must never be issued.
    #[must_use]
    pub fn with_reserved(mut self, reserved: RunScope) -> Self {
        self.reserved = reserved;
        self
    }

    /// Runs the batch and returns the per-person report.
    pub fn run<I>(&self, allocator: &UsernameAllocator, requests: I) -> BatchReport
    where
        I: IntoIterator<Item = BatchRequest>,
    {
        let mut run_scope = self.reserved.clone();
        let mut entries = Vec::new();
        let mut aborted = None;
        let mut requests = requests.into_iter();

        for request in requests.by_ref() {
            if !entries.is_empty() && !self.pause.is_zero() {
                thread::sleep(self.pause);
            }
            let result =
                allocator.allocate_for(request.reference.as_deref(), &request.name, &run_scope);
            let status = match result {
                Ok(allocation) => {
                    run_scope.insert(allocation.user_id.clone());
                    BatchEntryStatus::Allocated {
                        user_id: allocation.user_id,
                        tier: allocation.tier,
                        candidates_checked: allocation.candidates_checked,
                    }
                }
                Err(err) => {
                    let halt = matches!(err, AllocationError::OracleUnavailable(_))
                        && self.policy == OracleFailurePolicy::Abort;
                    if halt {
                        aborted = Some(err.to_string());
                    }
                    BatchEntryStatus::Failed {
                        outcome: err.outcome(),
                        error: err.to_string(),
                    }
                }
            };
            entries.push(BatchEntry {
                reference: request.reference,
                given_name: request.name.given_name,
                family_name: request.name.family_name,
                status,
            });
            if aborted.is_some() {
                break;
            }
        }

        let report = BatchReport {
            entries,
            not_attempted: requests.count(),
            aborted,
        };
        allocator.audit_sink().record_batch(&BatchAuditEvent::new(
            report.entries.len(),
            report.allocated_count(),
            report.not_attempted,
            report.aborted.clone(),
        ));
        report
    }
}
