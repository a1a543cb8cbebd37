// crates/idgen-core/tests/batch.rs
// ============================================================================
// Module: Batch Allocation Tests
// Description: Roster processing, failure policy, and report shape.
// Purpose: Verify the batch driver owns the run scope correctly.
// Dependencies: idgen-core, serde_json
// ============================================================================

//! ## Overview
//! Runs small rosters through [`BatchAllocator`] against in-memory oracles and
//! inspects the resulting [`idgen_core::BatchReport`].

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use idgen_core::AllocationAuditEvent;
use idgen_core::AllocationAuditSink;
use idgen_core::AllocationOutcome;
use idgen_core::BatchAllocator;
use idgen_core::BatchAuditEvent;
use idgen_core::BatchEntryStatus;
use idgen_core::BatchRequest;
use idgen_core::ExistenceOracle;
use idgen_core::OracleError;
use idgen_core::OracleFailurePolicy;
use idgen_core::PersonName;
use idgen_core::RunScope;
use idgen_core::UserId;
use idgen_core::UsernameAllocator;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Oracle with a fixed taken set that fails for candidates starting with `zz`
/// and reports every candidate starting with `busy` as taken.
struct RosterOracle {
    /// Identifiers reported present.
    taken: BTreeSet<String>,
}

impl ExistenceOracle for RosterOracle {
    fn oracle_id(&self) -> &str {
        "directory"
    }

    fn exists(&self, candidate: &UserId) -> Result<bool, OracleError> {
        if candidate.as_str().starts_with("zz") {
            return Err(OracleError::unavailable("directory", "timed out"));
        }
        if candidate.as_str().starts_with("busy") {
            return Ok(true);
        }
        Ok(self.taken.contains(candidate.as_str()))
    }
}

/// Audit sink capturing batch completion events.
#[derive(Default)]
struct BatchCapture {
    /// Captured batch events.
    batches: Mutex<Vec<BatchAuditEvent>>,
    /// Number of allocation events seen.
    allocations: Mutex<usize>,
}

impl AllocationAuditSink for BatchCapture {
    fn record_allocation(&self, _event: &AllocationAuditEvent) {
        *self.allocations.lock().unwrap() += 1;
    }

    fn record_batch(&self, event: &BatchAuditEvent) {
        self.batches.lock().unwrap().push(event.clone());
    }
}

/// Builds an allocator over one roster oracle.
fn allocator(taken: &[&str]) -> UsernameAllocator {
    UsernameAllocator::new(vec![Box::new(RosterOracle {
        taken: taken.iter().map(|value| (*value).to_string()).collect(),
    })])
}

/// Builds a request without a reference.
fn person(given: &str, family: &str) -> BatchRequest {
    BatchRequest::new(PersonName::new(given, family))
}

/// Returns issued identifiers as strings (`-` for failures).
fn issued(report: &idgen_core::BatchReport) -> Vec<String> {
    report
        .entries
        .iter()
        .map(|entry| entry.user_id().map_or_else(|| "-".to_string(), ToString::to_string))
        .collect()
}

// ============================================================================
// SECTION: Run Scope
// ============================================================================

#[test]
fn colliding_people_receive_distinct_identifiers() {
    let report = BatchAllocator::default().run(
        &allocator(&[]),
        vec![
            person("Anne", "O'Brien-Smith"),
            person("Alan", "OBriensmythe"),
            person("Anna", "O'Brien-Smithson"),
        ],
    );
    assert_eq!(issued(&report), vec!["obriensm", "obriensa", "obrien01"]);
    assert!(report.is_complete());
}

#[test]
fn reserved_identifiers_are_never_issued() {
    let reserved: RunScope = [UserId::parse("smith").unwrap()].into_iter().collect();
    let report = BatchAllocator::default()
        .with_reserved(reserved)
        .run(&allocator(&[]), vec![person("Anne", "Smith")]);
    assert_eq!(issued(&report), vec!["smitha"]);
}

// ============================================================================
// SECTION: Failure Policy
// ============================================================================

#[test]
fn invalid_names_do_not_stop_the_batch() {
    let report = BatchAllocator::default().run(
        &allocator(&[]),
        vec![person("Anne", "Smith"), person("", "Jones"), person("Carl", "Jones")],
    );
    assert_eq!(issued(&report), vec!["smith", "-", "jones"]);
    assert_eq!(report.failed_count(), 1);
    assert!(report.aborted.is_none());
    let BatchEntryStatus::Failed {
        outcome, ..
    } = &report.entries[1].status
    else {
        panic!("expected failure entry");
    };
    assert_eq!(*outcome, AllocationOutcome::InvalidName);
}

#[test]
fn exhausted_names_do_not_stop_the_batch() {
    let report = BatchAllocator::default().run(
        &allocator(&[]),
        vec![person("Anne", "Smith"), person("Bea", "Busy"), person("Carl", "Jones")],
    );
    assert_eq!(issued(&report), vec!["smith", "-", "jones"]);
    assert!(report.aborted.is_none());
    assert_eq!(report.not_attempted, 0);
    let BatchEntryStatus::Failed {
        outcome,
        error,
    } = &report.entries[1].status
    else {
        panic!("expected failure entry");
    };
    assert_eq!(*outcome, AllocationOutcome::Exhausted);
    assert!(error.contains("busy"));
}

#[test]
fn oracle_failure_aborts_by_default() {
    let report = BatchAllocator::new(OracleFailurePolicy::Abort).run(
        &allocator(&[]),
        vec![person("Anne", "Smith"), person("Zoe", "Zzyzx"), person("Carl", "Jones")],
    );
    assert_eq!(issued(&report), vec!["smith", "-"]);
    assert_eq!(report.not_attempted, 1);
    assert!(report.aborted.as_deref().unwrap().contains("timed out"));
    assert!(!report.is_complete());
}

#[test]
fn skip_policy_continues_after_oracle_failure() {
    let report = BatchAllocator::new(OracleFailurePolicy::Skip).run(
        &allocator(&[]),
        vec![person("Anne", "Smith"), person("Zoe", "Zzyzx"), person("Carl", "Jones")],
    );
    assert_eq!(issued(&report), vec!["smith", "-", "jones"]);
    assert_eq!(report.not_attempted, 0);
    assert!(report.aborted.is_none());
    assert_eq!(report.failed_count(), 1);
}

#[test]
fn batch_completion_is_audited() {
    let sink = Arc::new(BatchCapture::default());
    let allocator = allocator(&[]).with_audit(sink.clone());
    let _ = BatchAllocator::new(OracleFailurePolicy::Abort).run(
        &allocator,
        vec![person("Anne", "Smith"), person("Zoe", "Zzyzx"), person("Carl", "Jones")],
    );
    assert_eq!(*sink.allocations.lock().unwrap(), 2);
    let batches = sink.batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].attempted, 2);
    assert_eq!(batches[0].allocated, 1);
    assert_eq!(batches[0].failed, 1);
    assert_eq!(batches[0].not_attempted, 1);
}

// ============================================================================
// SECTION: Pacing
// ============================================================================

#[test]
fn pause_is_applied_between_people() {
    let pause = Duration::from_millis(40);
    let started = Instant::now();
    let report = BatchAllocator::default().with_pause(pause).run(
        &allocator(&[]),
        vec![person("Anne", "Smith"), person("Bea", "Jones"), person("Carl", "Brown")],
    );
    assert_eq!(report.allocated_count(), 3);
    assert!(started.elapsed() >= pause * 2);
}

#[test]
fn pause_is_not_applied_before_the_first_person() {
    let started = Instant::now();
    let report = BatchAllocator::default()
        .with_pause(Duration::from_secs(5))
        .run(&allocator(&[]), vec![person("Anne", "Smith")]);
    assert_eq!(report.allocated_count(), 1);
    assert!(started.elapsed() < Duration::from_secs(5));
}

// ============================================================================
// SECTION: Serialization
// ============================================================================

#[test]
fn roster_rows_deserialize_with_optional_reference() {
    let rows: Vec<BatchRequest> = serde_json::from_value(json!([
        {"reference": "E-100", "given_name": "Anne", "family_name": "Smith"},
        {"given_name": "Carl", "family_name": "Jones"}
    ]))
    .unwrap();
    assert_eq!(rows[0], person("Anne", "Smith").with_reference("E-100"));
    assert_eq!(rows[1], person("Carl", "Jones"));
}

#[test]
fn report_serializes_status_inline() {
    let report = BatchAllocator::default().run(
        &allocator(&["smith"]),
        vec![person("Anne", "Smith").with_reference("E-100"), person("", "")],
    );
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(
        value["entries"][0],
        json!({
            "reference": "E-100",
            "given_name": "Anne",
            "family_name": "Smith",
            "status": "allocated",
            "user_id": "smitha",
            "tier": "with_initial",
            "candidates_checked": 2
        })
    );
    assert_eq!(value["entries"][1]["status"], "failed");
    assert_eq!(value["entries"][1]["outcome"], "invalid_name");
    assert!(value.get("aborted").is_none());
}
