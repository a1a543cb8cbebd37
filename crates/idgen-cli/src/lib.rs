// crates/idgen-cli/src/lib.rs
// ============================================================================
// Module: idgen CLI Library
// Description: Shared helpers for the idgen command-line interface.
// Purpose: Provide reusable components (i18n, wiring) for the binary and tests.
// Dependencies: idgen-config, idgen-core, idgen-oracles, serde_json
// ============================================================================

//! ## Overview
//! This library houses the CLI's message catalog and the wiring that turns a
//! validated configuration into an allocator, audit sink, and batch driver.
//! The binary entry point (`src/main.rs`) imports these helpers so that all
//! user-facing output stays consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Internationalization helpers and message catalog.
pub mod i18n;
/// Construction of runtime components from configuration.
pub mod wiring;
