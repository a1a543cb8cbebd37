// crates/idgen-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Provides message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings for localized output.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The idgen CLI stores user-facing strings in a small translation catalog so
//! messaging stays consistent across commands. All runtime output should be
//! routed through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
///
/// # Invariants
/// - [`Locale::En`] is the default fallback locale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Catalan.
    Ca,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ca => "ca",
        }
    }

    /// Attempts to parse a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        let lang = normalized.split(['-', '_', '.']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "ca" => Some(Self::Ca),
            _ => None,
        }
    }
}

/// Ordered list of supported CLI locales.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Ca];

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "idgen {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.serialize_failed", "Failed to serialize output: {error}"),
    ("input.kind.roster", "roster"),
    ("input.read_failed", "Failed to read {kind} at {path}: {error}"),
    (
        "input.read_too_large",
        "Refusing to read {kind} at {path} because it is {size} bytes (limit {limit}).",
    ),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid ({count} oracles: {oracles})."),
    ("wiring.oracle_failed", "Failed to initialize oracles: {error}"),
    ("wiring.audit_failed", "Failed to open audit log at {path}: {error}"),
    ("allocate.failed", "Allocation failed: {error}"),
    ("batch.roster.parse_failed", "Failed to parse roster JSON at {path}: {error}"),
    ("batch.roster.too_many", "Roster at {path} has {count} entries (limit {limit})."),
    ("batch.output.write_failed", "Failed to write batch report to {path}: {error}"),
    ("batch.output.ok", "Batch report written to {path}"),
    (
        "batch.summary",
        "Batch finished: {allocated} allocated, {failed} failed, {not_attempted} not attempted.",
    ),
    ("batch.aborted", "Batch aborted: {reason}"),
    ("candidates.invalid_name", "Invalid name: {error}"),
    ("candidates.entry", "{index}\t{user_id}\ttier {tier}"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
];

/// Static Catalan catalog entries.
const CATALOG_CA: &[(&str, &str)] = &[
    ("main.version", "idgen {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "sortida"),
    ("output.write_failed", "No s'ha pogut escriure a {stream}: {error}"),
    ("output.serialize_failed", "No s'ha pogut serialitzar la sortida: {error}"),
    ("input.kind.roster", "llista de persones"),
    ("input.read_failed", "No s'ha pogut llegir {kind} a {path}: {error}"),
    (
        "input.read_too_large",
        "No es llegirà {kind} a {path} perquè ocupa {size} bytes (límit {limit}).",
    ),
    ("config.load_failed", "No s'ha pogut carregar la configuració: {error}"),
    ("config.validate.ok", "Configuració vàlida ({count} oracles: {oracles})."),
    ("wiring.oracle_failed", "No s'han pogut inicialitzar els oracles: {error}"),
    ("wiring.audit_failed", "No s'ha pogut obrir el registre d'auditoria a {path}: {error}"),
    ("allocate.failed", "No s'ha pogut assignar l'identificador: {error}"),
    ("batch.roster.parse_failed", "No s'ha pogut analitzar el JSON de {path}: {error}"),
    ("batch.roster.too_many", "La llista de {path} té {count} entrades (límit {limit})."),
    ("batch.output.write_failed", "No s'ha pogut escriure l'informe a {path}: {error}"),
    ("batch.output.ok", "Informe del lot escrit a {path}"),
    (
        "batch.summary",
        "Lot acabat: {allocated} assignats, {failed} fallits, {not_attempted} sense intentar.",
    ),
    ("batch.aborted", "Lot interromput: {reason}"),
    ("candidates.invalid_name", "Nom no vàlid: {error}"),
    ("candidates.entry", "{index}\t{user_id}\tnivell {tier}"),
    ("i18n.lang.invalid_env", "Valor no vàlid per a {env}: {value}. S'esperava 'en' o 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la sortida que no és en anglès està traduïda automàticament i pot ser inexacta.",
    ),
];

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_CA_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    match locale {
        Locale::En => CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect()),
        Locale::Ca => CATALOG_CA_MAP.get_or_init(|| CATALOG_CA.iter().copied().collect()),
    }
}

/// Returns catalog keys missing from `locale` relative to English.
#[must_use]
pub fn missing_keys(locale: Locale) -> Vec<&'static str> {
    let catalog = catalog_for(locale);
    let mut missing: Vec<&'static str> =
        CATALOG_EN.iter().map(|(key, _)| *key).filter(|key| !catalog.contains_key(key)).collect();
    missing.sort_unstable();
    missing
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    translate_in(current_locale(), key, args)
}

/// Translates `key` in an explicit locale while substituting `args`.
#[must_use]
pub fn translate_in(locale: Locale, key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog_for(locale)
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
///
/// # Returns
///
/// A localized [`String`] with placeholders substituted.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
