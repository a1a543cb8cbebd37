// crates/idgen-oracles/src/lib.rs
// ============================================================================
// Module: idgen Oracles
// Description: Built-in existence oracles and the oracle registry.
// Purpose: Answer "is this identifier taken?" for directories and databases.
// Dependencies: idgen-core, reqwest, rusqlite, serde
// ============================================================================

//! ## Overview
//! This crate ships the built-in existence oracles (HTTP directory lookup,
//! `SQLite` count query, static list) and a registry that orders them for the
//! allocator. Every oracle is read-only and fails closed: an unreachable or
//! misbehaving system yields an error, never "absent".

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod http;
pub mod list;
pub mod registry;
pub mod sql;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use http::HttpLookupConfig;
pub use http::HttpLookupOracle;
pub use list::ListConfig;
pub use list::ListOracle;
pub use registry::OracleRegistry;
pub use registry::OracleSettings;
pub use sql::SqlCountConfig;
pub use sql::SqlCountOracle;
