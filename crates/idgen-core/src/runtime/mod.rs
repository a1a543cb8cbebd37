// crates/idgen-core/src/runtime/mod.rs
// ============================================================================
// Module: idgen Runtime
// Description: Allocator, batch driver, and audit sinks.
// Purpose: Turn names into issued identifiers against injected oracles.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime composes the deterministic candidate order from [`crate::core`]
//! with caller-supplied [`crate::ExistenceOracle`]s. Single allocations go
//! through [`UsernameAllocator`]; rosters go through [`BatchAllocator`], which
//! owns the run scope for the duration of the batch.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod allocator;
pub mod audit;
pub mod batch;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use allocator::Allocation;
pub use allocator::AllocationError;
pub use allocator::RUN_SCOPE_HOLDER;
pub use allocator::UsernameAllocator;
pub use allocator::allocate;
pub use audit::AllocationAuditEvent;
pub use audit::AllocationAuditEventParams;
pub use audit::AllocationAuditSink;
pub use audit::AllocationOutcome;
pub use audit::BatchAuditEvent;
pub use audit::CandidateAuditEvent;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use batch::BatchAllocator;
pub use batch::BatchEntry;
pub use batch::BatchEntryStatus;
pub use batch::BatchReport;
pub use batch::BatchRequest;
pub use batch::OracleFailurePolicy;
