// crates/idgen-oracles/src/registry.rs
// ============================================================================
// Module: Oracle Registry
// Description: Ordered registry of existence oracles.
// Purpose: Build oracles from typed settings and hand them to the allocator.
// Dependencies: idgen-core
// ============================================================================

//! ## Overview
//! The registry keeps oracles in registration order, which is the order the
//! allocator consults them. Oracle identifiers must be unique so audit events
//! and errors name exactly one system.

// ============================================================================
// SECTION: Imports
// ============================================================================

use idgen_core::ExistenceOracle;
use idgen_core::OracleError;
use idgen_core::UsernameAllocator;

use crate::HttpLookupConfig;
use crate::HttpLookupOracle;
use crate::ListConfig;
use crate::ListOracle;
use crate::SqlCountConfig;
use crate::SqlCountOracle;

// ============================================================================
// SECTION: Oracle Settings
// ============================================================================

/// Typed settings for one built-in oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleSettings {
    /// HTTP directory lookup.
    Http(HttpLookupConfig),
    /// `SQLite` count query.
    Sql(SqlCountConfig),
    /// Static identifier list.
    List(ListConfig),
}

impl OracleSettings {
    /// Builds the oracle described by these settings.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Misconfigured`] when the oracle cannot be built.
    pub fn build(
        self,
        oracle_id: &str,
    ) -> Result<Box<dyn ExistenceOracle + Send + Sync>, OracleError> {
        Ok(match self {
            Self::Http(config) => Box::new(HttpLookupOracle::new(oracle_id, config)?),
            Self::Sql(config) => Box::new(SqlCountOracle::new(oracle_id, config)?),
            Self::List(config) => Box::new(ListOracle::load(oracle_id, &config)?),
        })
    }
}

// ============================================================================
// SECTION: Oracle Registry
// ============================================================================

/// Ordered collection of oracles with unique identifiers.
#[derive(Default)]
pub struct OracleRegistry {
    /// Oracles in consultation order.
    oracles: Vec<Box<dyn ExistenceOracle + Send + Sync>>,
}

impl OracleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an oracle after the ones already present.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Misconfigured`] when the identifier is empty or
    /// already registered.
    pub fn register(
        &mut self,
        oracle: impl ExistenceOracle + Send + Sync + 'static,
    ) -> Result<(), OracleError> {
        self.register_boxed(Box::new(oracle))
    }

    /// Registers an already boxed oracle.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Misconfigured`] when the identifier is empty or
    /// already registered.
    pub fn register_boxed(
        &mut self,
        oracle: Box<dyn ExistenceOracle + Send + Sync>,
    ) -> Result<(), OracleError> {
        let oracle_id = oracle.oracle_id();
        if oracle_id.trim().is_empty() {
            return Err(OracleError::misconfigured(oracle_id, "oracle id is empty"));
        }
        if self.contains(oracle_id) {
            return Err(OracleError::misconfigured(oracle_id, "oracle id registered twice"));
        }
        self.oracles.push(oracle);
        Ok(())
    }

    /// Builds and registers an oracle from typed settings.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Misconfigured`] when the oracle cannot be built
    /// or its identifier is already registered.
    pub fn register_settings(
        &mut self,
        oracle_id: &str,
        settings: OracleSettings,
    ) -> Result<(), OracleError> {
        if self.contains(oracle_id) {
            return Err(OracleError::misconfigured(oracle_id, "oracle id registered twice"));
        }
        let oracle = settings.build(oracle_id)?;
        self.register_boxed(oracle)
    }

    /// Returns true when an oracle with this identifier is registered.
    #[must_use]
    pub fn contains(&self, oracle_id: &str) -> bool {
        self.oracles.iter().any(|oracle| oracle.oracle_id() == oracle_id)
    }

    /// Returns oracle identifiers in consultation order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.oracles.iter().map(|oracle| oracle.oracle_id()).collect()
    }

    /// Number of registered oracles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    /// Returns true when no oracle is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }

    /// Consumes the registry and returns oracles in consultation order.
    #[must_use]
    pub fn into_oracles(self) -> Vec<Box<dyn ExistenceOracle + Send + Sync>> {
        self.oracles
    }

    /// Consumes the registry and builds an allocator over its oracles.
    #[must_use]
    pub fn into_allocator(self) -> UsernameAllocator {
        UsernameAllocator::new(self.oracles)
    }
}
