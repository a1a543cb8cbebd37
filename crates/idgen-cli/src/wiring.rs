// crates/idgen-cli/src/wiring.rs
// ============================================================================
// Module: Runtime Wiring
// Description: Builds allocators, audit sinks, and batch drivers from config.
// Purpose: Keep construction logic testable outside the binary entry point.
// Dependencies: idgen-config, idgen-core, idgen-oracles, serde_json
// ============================================================================

//! ## Overview
//! Turns a validated [`IdgenConfig`] into runtime components. Oracles are
//! registered in configuration order, so the allocator consults them in the
//! same order the operator listed them. Roster files are read with a hard
//! size limit before parsing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use idgen_config::AuditConfig;
use idgen_config::AuditSinkKind;
use idgen_config::BatchConfig;
use idgen_config::ConfigError;
use idgen_config::IdgenConfig;
use idgen_core::AllocationAuditSink;
use idgen_core::BatchAllocator;
use idgen_core::BatchRequest;
use idgen_core::FileAuditSink;
use idgen_core::NoopAuditSink;
use idgen_core::OracleError;
use idgen_core::StderrAuditSink;
use idgen_core::UsernameAllocator;
use idgen_oracles::OracleRegistry;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures while assembling runtime components.
#[derive(Debug, Error)]
pub enum WiringError {
    /// Configuration could not be decoded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// An oracle could not be constructed.
    #[error(transparent)]
    Oracle(#[from] OracleError),
    /// The audit log could not be opened.
    #[error("audit log {path}: {error}")]
    Audit {
        /// Audit log path.
        path: PathBuf,
        /// Underlying I/O error message.
        error: String,
    },
}

/// Failures while reading a roster file.
#[derive(Debug, Error)]
pub enum RosterError {
    /// File I/O failure.
    #[error("roster io error at {path}: {error}")]
    Io {
        /// Roster path.
        path: PathBuf,
        /// Underlying I/O error message.
        error: String,
    },
    /// File exceeds the configured byte limit.
    #[error("roster at {path} is {size} bytes (limit {limit})")]
    TooLarge {
        /// Roster path.
        path: PathBuf,
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
    /// File is not a JSON array of people.
    #[error("roster at {path} is not valid JSON: {error}")]
    Parse {
        /// Roster path.
        path: PathBuf,
        /// Parser error message.
        error: String,
    },
    /// Roster exceeds the configured entry limit.
    #[error("roster at {path} has {count} entries (limit {limit})")]
    TooManyEntries {
        /// Roster path.
        path: PathBuf,
        /// Number of entries in the file.
        count: usize,
        /// Allowed number of entries.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Builds the allocator with oracles and audit sink from configuration.
///
/// # Errors
///
/// Returns [`WiringError`] when an oracle or the audit sink cannot be built.
pub fn build_allocator(config: &IdgenConfig) -> Result<UsernameAllocator, WiringError> {
    let mut registry = OracleRegistry::new();
    for (name, settings) in config.oracle_settings()? {
        registry.register_settings(&name, settings)?;
    }
    let audit = build_audit_sink(&config.audit)?;
    Ok(registry
        .into_allocator()
        .with_audit(audit)
        .with_candidate_audit(config.audit.log_candidates))
}

/// Builds the configured audit sink.
///
/// # Errors
///
/// Returns [`WiringError::Audit`] when the audit file cannot be opened.
pub fn build_audit_sink(config: &AuditConfig) -> Result<Arc<dyn AllocationAuditSink>, WiringError> {
    match (config.sink, &config.path) {
        (AuditSinkKind::File, Some(path)) => {
            let sink = FileAuditSink::new(path).map_err(|err| WiringError::Audit {
                path: path.clone(),
                error: err.to_string(),
            })?;
            Ok(Arc::new(sink))
        }
        (AuditSinkKind::File, None) => Err(WiringError::Config(ConfigError::Invalid(
            "audit.path is required for the file sink".to_string(),
        ))),
        (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
        (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
    }
}

/// Builds the batch driver with policy, pacing, and reserved identifiers.
///
/// # Errors
///
/// Returns [`WiringError::Config`] when a reserved identifier is malformed.
pub fn build_batch(config: &BatchConfig) -> Result<BatchAllocator, WiringError> {
    Ok(BatchAllocator::new(config.on_oracle_failure)
        .with_pause(Duration::from_millis(config.pause_ms))
        .with_reserved(config.reserved_scope()?))
}

// ============================================================================
// SECTION: Roster Input
// ============================================================================

/// Reads a JSON roster (array of people) with size and entry limits.
///
/// # Errors
///
/// Returns [`RosterError`] when the file cannot be read, is too large, fails
/// to parse, or holds more entries than allowed.
pub fn read_roster(path: &Path, config: &BatchConfig) -> Result<Vec<BatchRequest>, RosterError> {
    let bytes = read_bytes_with_limit(path, config.max_roster_bytes)?;
    let requests: Vec<BatchRequest> =
        serde_json::from_slice(&bytes).map_err(|err| RosterError::Parse {
            path: path.to_path_buf(),
            error: err.to_string(),
        })?;
    if requests.len() > config.max_roster_entries {
        return Err(RosterError::TooManyEntries {
            path: path.to_path_buf(),
            count: requests.len(),
            limit: config.max_roster_entries,
        });
    }
    Ok(requests)
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, RosterError> {
    let io_error = |err: std::io::Error| RosterError::Io {
        path: path.to_path_buf(),
        error: err.to_string(),
    };
    let too_large = |size: u64| RosterError::TooLarge {
        path: path.to_path_buf(),
        size,
        limit: max_bytes,
    };
    let file = File::open(path).map_err(io_error)?;
    let size = file.metadata().map_err(io_error)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| too_large(size))?;
    if size > limit {
        return Err(too_large(size));
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(io_error)?;
    if bytes.len() > max_bytes {
        return Err(too_large(u64::try_from(bytes.len()).unwrap_or(u64::MAX)));
    }
    Ok(bytes)
}
