// crates/idgen-core/src/lib.rs
// ============================================================================
// Module: idgen Core Library
// Description: Public API surface for the username allocator core.
// Purpose: Expose name/identifier types, oracle interfaces, and the allocator.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! idgen core derives login identifiers from a person's name and resolves
//! uniqueness against injected existence oracles (directory, database, LMS,
//! groupware). The search is deterministic and backend-agnostic: concrete
//! oracles live in `idgen-oracles` and are supplied by the caller.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::ExistenceOracle;
pub use interfaces::OracleError;
pub use runtime::Allocation;
pub use runtime::AllocationAuditEvent;
pub use runtime::AllocationAuditEventParams;
pub use runtime::AllocationAuditSink;
pub use runtime::AllocationError;
pub use runtime::AllocationOutcome;
pub use runtime::BatchAllocator;
pub use runtime::BatchAuditEvent;
pub use runtime::BatchEntry;
pub use runtime::BatchEntryStatus;
pub use runtime::BatchReport;
pub use runtime::BatchRequest;
pub use runtime::CandidateAuditEvent;
pub use runtime::FileAuditSink;
pub use runtime::NoopAuditSink;
pub use runtime::OracleFailurePolicy;
pub use runtime::RUN_SCOPE_HOLDER;
pub use runtime::StderrAuditSink;
pub use runtime::UsernameAllocator;
pub use runtime::allocate;
