// crates/idgen-core/src/core/mod.rs
// ============================================================================
// Module: idgen Core Types
// Description: Person names, login identifiers, candidate tiers, and run scope.
// Purpose: Provide stable, serializable types shared by the allocator and callers.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types describe the inputs (person names), the computed values
//! (candidate identifiers and their tiers), and the per-batch run scope.
//! They carry no I/O and are the canonical source of truth for CLI output.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod candidates;
pub mod identifiers;
pub mod name;
pub mod run_scope;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use candidates::CANDIDATE_SPACE_SIZE;
pub use candidates::Candidate;
pub use candidates::CandidateSequence;
pub use candidates::Tier;
pub use identifiers::MAX_USER_ID_LENGTH;
pub use identifiers::UserId;
pub use identifiers::UserIdError;
pub use name::NameError;
pub use name::NormalizedName;
pub use name::PersonName;
pub use run_scope::RunScope;
