// crates/idgen-core/src/runtime/audit.rs
// ============================================================================
// Module: Allocation Audit Logging
// Description: Structured audit events for allocation and batch outcomes.
// Purpose: Emit JSON-line audit logs without a hard logging dependency.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every allocation attempt produces one [`AllocationAuditEvent`]. Rejected
//! candidates may optionally produce [`CandidateAuditEvent`]s, and a batch run
//! ends with a [`BatchAuditEvent`]. Sinks serialize events as single JSON
//! lines so operators can route them to any log pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::Tier;
use crate::core::UserId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Allocation outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationOutcome {
    /// An identifier was allocated.
    Allocated,
    /// The name normalized to nothing.
    InvalidName,
    /// Every candidate was taken.
    Exhausted,
    /// An oracle could not answer.
    OracleUnavailable,
}

/// Allocation audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Caller-supplied reference (employee number, roster row).
    pub reference: Option<String>,
    /// Given name as supplied.
    pub given_name: String,
    /// Family name as supplied.
    pub family_name: String,
    /// Allocation outcome.
    pub outcome: AllocationOutcome,
    /// Allocated identifier on success.
    pub user_id: Option<UserId>,
    /// Tier of the allocated identifier on success.
    pub tier: Option<Tier>,
    /// Number of candidates examined.
    pub candidates_checked: usize,
    /// Oracle that failed, when the outcome is `oracle_unavailable`.
    pub oracle: Option<String>,
    /// Error message on failure.
    pub error: Option<String>,
}

/// Inputs required to construct an allocation audit event.
pub struct AllocationAuditEventParams {
    /// Caller-supplied reference.
    pub reference: Option<String>,
    /// Given name as supplied.
    pub given_name: String,
    /// Family name as supplied.
    pub family_name: String,
    /// Allocation outcome.
    pub outcome: AllocationOutcome,
    /// Allocated identifier on success.
    pub user_id: Option<UserId>,
    /// Tier of the allocated identifier on success.
    pub tier: Option<Tier>,
    /// Number of candidates examined.
    pub candidates_checked: usize,
    /// Oracle that failed.
    pub oracle: Option<String>,
    /// Error message on failure.
    pub error: Option<String>,
}

impl AllocationAuditEvent {
    /// Creates a new allocation audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: AllocationAuditEventParams) -> Self {
        let event = match params.outcome {
            AllocationOutcome::Allocated => "allocation_succeeded",
            _ => "allocation_failed",
        };
        Self {
            event,
            timestamp_ms: now_ms(),
            reference: params.reference,
            given_name: params.given_name,
            family_name: params.family_name,
            outcome: params.outcome,
            user_id: params.user_id,
            tier: params.tier,
            candidates_checked: params.candidates_checked,
            oracle: params.oracle,
            error: params.error,
        }
    }
}

/// Rejected candidate audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Rejected candidate.
    pub user_id: UserId,
    /// Tier of the rejected candidate.
    pub tier: Tier,
    /// Oracle identifier (or `run_scope`) that reported the candidate present.
    pub held_by: String,
}

impl CandidateAuditEvent {
    /// Creates a new rejected-candidate audit event.
    #[must_use]
    pub fn new(user_id: UserId, tier: Tier, held_by: &str) -> Self {
        Self {
            event: "candidate_rejected",
            timestamp_ms: now_ms(),
            user_id,
            tier,
            held_by: held_by.to_string(),
        }
    }
}

/// Batch completion audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct BatchAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Number of people in the roster that were attempted.
    pub attempted: usize,
    /// Number of identifiers allocated.
    pub allocated: usize,
    /// Number of per-person failures.
    pub failed: usize,
    /// Number of people never attempted because the batch aborted.
    pub not_attempted: usize,
    /// Abort reason, when the batch stopped early.
    pub aborted: Option<String>,
}

impl BatchAuditEvent {
    /// Creates a new batch completion audit event.
    #[must_use]
    pub fn new(
        attempted: usize,
        allocated: usize,
        not_attempted: usize,
        aborted: Option<String>,
    ) -> Self {
        Self {
            event: "batch_completed",
            timestamp_ms: now_ms(),
            attempted,
            allocated,
            failed: attempted.saturating_sub(allocated),
            not_attempted,
            aborted,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for allocation events.
pub trait AllocationAuditSink: Send + Sync {
    /// Record an allocation outcome.
    fn record_allocation(&self, event: &AllocationAuditEvent);

    /// Record a rejected candidate.
    fn record_candidate(&self, _event: &CandidateAuditEvent) {}

    /// Record a batch completion.
    fn record_batch(&self, _event: &BatchAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AllocationAuditSink for StderrAuditSink {
    fn record_allocation(&self, event: &AllocationAuditEvent) {
        write_line(&mut io::stderr(), event);
    }

    fn record_candidate(&self, event: &CandidateAuditEvent) {
        write_line(&mut io::stderr(), event);
    }

    fn record_batch(&self, event: &BatchAuditEvent) {
        write_line(&mut io::stderr(), event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one event while holding the file lock.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(mut file) = self.file.lock() {
            write_line(&mut *file, event);
        }
    }
}

impl AllocationAuditSink for FileAuditSink {
    fn record_allocation(&self, event: &AllocationAuditEvent) {
        self.append(event);
    }

    fn record_candidate(&self, event: &CandidateAuditEvent) {
        self.append(event);
    }

    fn record_batch(&self, event: &BatchAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AllocationAuditSink for NoopAuditSink {
    fn record_allocation(&self, _event: &AllocationAuditEvent) {}
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Milliseconds since the Unix epoch (zero if the clock is before it).
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Serializes an event as one JSON line; write failures are dropped.
fn write_line<W: Write, T: Serialize>(writer: &mut W, event: &T) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(writer, "{payload}");
        let _ = writer.flush();
    }
}
