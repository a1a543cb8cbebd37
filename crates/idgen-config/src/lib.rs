// crates/idgen-config/src/lib.rs
// ============================================================================
// Module: idgen Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for idgen.toml semantics.
// Dependencies: idgen-core, idgen-oracles, serde, toml
// ============================================================================

//! ## Overview
//! `idgen-config` defines the configuration model for the `idgen` CLI: the
//! ordered list of existence oracles, batch policy, and audit sink. Parsing
//! is strict and fail-closed; unknown keys are rejected.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
