// crates/idgen-core/tests/allocator.rs
// ============================================================================
// Module: Allocator Tests
// Description: Search order, run-scope, exhaustion, and oracle failure cases.
// Purpose: Pin the allocation contract against in-memory oracles.
// Dependencies: idgen-core
// ============================================================================

//! ## Overview
//! Exercises the allocator with set-backed oracles that record every lookup,
//! so tests can assert both the returned identifier and which candidates each
//! oracle was asked about.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use idgen_core::AllocationError;
use idgen_core::CANDIDATE_SPACE_SIZE;
use idgen_core::ExistenceOracle;
use idgen_core::NameError;
use idgen_core::OracleError;
use idgen_core::PersonName;
use idgen_core::RunScope;
use idgen_core::Tier;
use idgen_core::UserId;
use idgen_core::UsernameAllocator;
use idgen_core::allocate;

// ============================================================================
// SECTION: Test Oracles
// ============================================================================

/// Oracle backed by a fixed set of taken identifiers.
struct SetOracle {
    /// Oracle identifier.
    id: &'static str,
    /// Identifiers reported present.
    taken: BTreeSet<String>,
    /// Every candidate this oracle was asked about.
    calls: Arc<Mutex<Vec<String>>>,
}

impl SetOracle {
    fn new(id: &'static str, taken: &[&str]) -> Self {
        Self {
            id,
            taken: taken.iter().map(|value| (*value).to_string()).collect(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

impl ExistenceOracle for SetOracle {
    fn oracle_id(&self) -> &str {
        self.id
    }

    fn exists(&self, candidate: &UserId) -> Result<bool, OracleError> {
        self.calls.lock().unwrap().push(candidate.to_string());
        Ok(self.taken.contains(candidate.as_str()))
    }
}

/// Oracle that reports every candidate present.
struct FullOracle;

impl ExistenceOracle for FullOracle {
    fn oracle_id(&self) -> &str {
        "full"
    }

    fn exists(&self, _candidate: &UserId) -> Result<bool, OracleError> {
        Ok(true)
    }
}

/// Oracle that can never answer.
struct DownOracle {
    /// Number of lookups attempted.
    calls: Arc<Mutex<usize>>,
}

impl ExistenceOracle for DownOracle {
    fn oracle_id(&self) -> &str {
        "directory"
    }

    fn exists(&self, _candidate: &UserId) -> Result<bool, OracleError> {
        *self.calls.lock().unwrap() += 1;
        Err(OracleError::unavailable("directory", "connection refused"))
    }
}

fn anne() -> PersonName {
    PersonName::new("Anne", "O'Brien-Smith")
}

// ============================================================================
// SECTION: Search Order
// ============================================================================

#[test]
fn free_name_gets_truncated_family() {
    let oracle = SetOracle::new("directory", &[]);
    let user_id = allocate(&anne(), &[&oracle], &RunScope::new()).unwrap();
    assert_eq!(user_id.as_str(), "obriensm");
}

#[test]
fn taken_truncated_falls_back_to_initial() {
    let oracle = SetOracle::new("directory", &["obriensm"]);
    let user_id = allocate(&anne(), &[&oracle], &RunScope::new()).unwrap();
    assert_eq!(user_id.as_str(), "obriensa");
}

#[test]
fn numeric_tiers_ascend() {
    let oracle = SetOracle::new("directory", &["obriensm", "obriensa", "obrien01", "obrien02"]);
    let user_id = allocate(&anne(), &[&oracle], &RunScope::new()).unwrap();
    assert_eq!(user_id.as_str(), "obrien03");
}

#[test]
fn short_family_name_is_used_whole() {
    let oracle = SetOracle::new("directory", &["li", "liw"]);
    let name = PersonName::new("Wei", "Li");
    let user_id = allocate(&name, &[&oracle], &RunScope::new()).unwrap();
    assert_eq!(user_id.as_str(), "li01");
}

#[test]
fn every_oracle_must_report_absent() {
    let directory = SetOracle::new("directory", &["obriensm"]);
    let database = SetOracle::new("database", &["obriensa"]);
    let lms = SetOracle::new("lms", &["obrien01"]);
    let groupware = SetOracle::new("groupware", &["obrien02"]);
    let user_id =
        allocate(&anne(), &[&directory, &database, &lms, &groupware], &RunScope::new()).unwrap();
    assert_eq!(user_id.as_str(), "obrien03");
}

// ============================================================================
// SECTION: Short-Circuit
// ============================================================================

#[test]
fn later_oracles_skip_candidates_already_taken() {
    let directory = SetOracle::new("directory", &["obriensm"]);
    let database = SetOracle::new("database", &[]);
    let database_calls = database.calls();
    let user_id = allocate(&anne(), &[&directory, &database], &RunScope::new()).unwrap();
    assert_eq!(user_id.as_str(), "obriensa");
    assert_eq!(*database_calls.lock().unwrap(), vec!["obriensa".to_string()]);
}

#[test]
fn run_scope_is_consulted_before_oracles() {
    let directory = SetOracle::new("directory", &[]);
    let calls = directory.calls();
    let scope: RunScope = [UserId::parse("obriensm").unwrap()].into_iter().collect();
    let user_id = allocate(&anne(), &[&directory], &scope).unwrap();
    assert_eq!(user_id.as_str(), "obriensa");
    assert_eq!(*calls.lock().unwrap(), vec!["obriensa".to_string()]);
}

// ============================================================================
// SECTION: Run Scope
// ============================================================================

#[test]
fn colliding_people_need_the_run_scope() {
    let oracle = SetOracle::new("directory", &[]);
    let first = PersonName::new("Anne", "O'Brien-Smith");
    let second = PersonName::new("Alan", "OBriensmythe");
    let mut scope = RunScope::new();

    let first_id = allocate(&first, &[&oracle], &scope).unwrap();
    assert_eq!(first_id.as_str(), "obriensm");

    let unscoped = allocate(&second, &[&oracle], &scope).unwrap();
    assert_eq!(unscoped, first_id, "without the scope both people collide");

    scope.insert(first_id.clone());
    let second_id = allocate(&second, &[&oracle], &scope).unwrap();
    assert_eq!(second_id.as_str(), "obriensa");
    assert_ne!(second_id, first_id);
}

#[test]
fn allocator_does_not_write_the_run_scope() {
    let oracle = SetOracle::new("directory", &[]);
    let scope = RunScope::new();
    let _ = allocate(&anne(), &[&oracle], &scope).unwrap();
    assert!(scope.is_empty());
}

#[test]
fn search_is_idempotent_without_mutation() {
    let oracle = SetOracle::new("directory", &["obriensm", "obriensa"]);
    let scope = RunScope::new();
    let first = allocate(&anne(), &[&oracle], &scope).unwrap();
    let second = allocate(&anne(), &[&oracle], &scope).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// SECTION: Failures
// ============================================================================

#[test]
fn exhaustion_reports_prefix_without_fabricating() {
    let err = allocate(&anne(), &[&FullOracle], &RunScope::new()).unwrap_err();
    assert_eq!(
        err,
        AllocationError::Exhausted {
            prefix: "obri".to_string(),
            candidates_checked: CANDIDATE_SPACE_SIZE,
        }
    );
}

#[test]
fn oracle_failure_propagates_and_stops_search() {
    let calls = Arc::new(Mutex::new(0));
    let directory = DownOracle {
        calls: Arc::clone(&calls),
    };
    let database = SetOracle::new("database", &[]);
    let database_calls = database.calls();

    let err = allocate(&anne(), &[&directory, &database], &RunScope::new()).unwrap_err();

    assert_eq!(
        err,
        AllocationError::OracleUnavailable(OracleError::unavailable(
            "directory",
            "connection refused"
        ))
    );
    assert_eq!(*calls.lock().unwrap(), 1);
    assert!(database_calls.lock().unwrap().is_empty());
}

#[test]
fn invalid_names_never_reach_oracles() {
    let oracle = SetOracle::new("directory", &[]);
    let calls = oracle.calls();

    let err = allocate(&PersonName::new("", "Smith"), &[&oracle], &RunScope::new()).unwrap_err();
    assert_eq!(err, AllocationError::InvalidName(NameError::EmptyGivenName));

    let err = allocate(&PersonName::new("Anne", "-'-"), &[&oracle], &RunScope::new()).unwrap_err();
    assert_eq!(err, AllocationError::InvalidName(NameError::EmptyFamilyName));

    assert!(calls.lock().unwrap().is_empty());
}

// ============================================================================
// SECTION: Username Allocator
// ============================================================================

#[test]
fn username_allocator_reports_tier_and_checked_count() {
    let allocator = UsernameAllocator::new(vec![
        Box::new(SetOracle::new("directory", &["obriensm"])),
        Box::new(SetOracle::new("database", &["obriensa", "obrien01"])),
    ]);
    assert_eq!(allocator.oracle_ids(), vec!["directory", "database"]);

    let allocation = allocator.allocate(&anne(), &RunScope::new()).unwrap();
    assert_eq!(allocation.user_id.as_str(), "obrien02");
    assert_eq!(allocation.tier, Tier::SingleDigit);
    assert_eq!(allocation.candidates_checked, 4);
}

#[test]
fn username_allocator_matches_free_function() {
    let taken = ["obriensm", "obriensa", "obrien01"];
    let allocator = UsernameAllocator::new(vec![Box::new(SetOracle::new("directory", &taken))]);
    let oracle = SetOracle::new("directory", &taken);
    let scope = RunScope::new();

    let owned = allocator.allocate(&anne(), &scope).unwrap();
    let free = allocate(&anne(), &[&oracle], &scope).unwrap();
    assert_eq!(owned.user_id, free);
}
