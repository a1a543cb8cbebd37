// crates/idgen-oracles/src/http.rs
// ============================================================================
// Module: HTTP Lookup Oracle
// Description: Existence oracle backed by a directory-style REST lookup.
// Purpose: Ask a directory or groupware API whether an account name exists.
// Dependencies: idgen-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! The HTTP lookup oracle renders a URL template with the candidate, issues a
//! bounded GET, and classifies the answer. Configured "absent" statuses (404
//! by default) mean the identifier is free; any other non-2xx status means the
//! system could not answer. On success the JSON value at `result_pointer`
//! decides presence; without a pointer, a 2xx status alone means present.
//!
//! The oracle enforces scheme restrictions, host allowlists, disabled
//! redirects, and response size limits. It never maps a failure to "absent".

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::io::Read;
use std::time::Duration;

use idgen_core::ExistenceOracle;
use idgen_core::OracleError;
use idgen_core::UserId;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Placeholder replaced by the candidate identifier in URL templates.
pub const ID_PLACEHOLDER: &str = "{id}";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP lookup oracle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpLookupConfig {
    /// URL template containing `{id}`.
    pub url_template: String,
    /// JSON pointer selecting the value that decides presence.
    pub result_pointer: Option<String>,
    /// Environment variable holding a bearer token.
    pub bearer_token_env: Option<String>,
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// Optional host allowlist.
    pub allowed_hosts: Option<BTreeSet<String>>,
    /// User agent string for outbound requests.
    pub user_agent: String,
    /// Statuses that mean "identifier not found".
    pub absent_statuses: BTreeSet<u16>,
}

impl Default for HttpLookupConfig {
    fn default() -> Self {
        Self {
            url_template: String::new(),
            result_pointer: None,
            bearer_token_env: None,
            allow_http: false,
            timeout_ms: 5_000,
            max_response_bytes: 1024 * 1024,
            allowed_hosts: None,
            user_agent: "idgen/0.1".to_string(),
            absent_statuses: BTreeSet::from([404]),
        }
    }
}

// ============================================================================
// SECTION: Oracle Implementation
// ============================================================================

/// Existence oracle issuing HTTP lookups.
pub struct HttpLookupOracle {
    /// Oracle identifier.
    oracle_id: String,
    /// Oracle configuration, including limits and policy.
    config: HttpLookupConfig,
    /// Bearer token attached to every request.
    bearer_token: Option<String>,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpLookupOracle {
    /// Creates a new HTTP lookup oracle.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Misconfigured`] when the template, pointer, or
    /// token source is invalid, or the HTTP client cannot be created.
    pub fn new(oracle_id: impl Into<String>, config: HttpLookupConfig) -> Result<Self, OracleError> {
        let oracle_id = oracle_id.into();
        validate_template(&oracle_id, &config)?;
        validate_absent_statuses(&config.absent_statuses)
            .map_err(|message| OracleError::misconfigured(&oracle_id, message))?;
        if let Some(pointer) = &config.result_pointer
            && !pointer.is_empty()
            && !pointer.starts_with('/')
        {
            return Err(OracleError::misconfigured(
                &oracle_id,
                "result_pointer must be empty or start with '/'",
            ));
        }
        let bearer_token = match &config.bearer_token_env {
            Some(name) => Some(read_token(&oracle_id, name)?),
            None => None,
        };
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|_| OracleError::misconfigured(&oracle_id, "http client build failed"))?;
        Ok(Self {
            oracle_id,
            config,
            bearer_token,
            client,
        })
    }

    /// Replaces the bearer token sent with each request.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Renders the lookup URL for a candidate.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Misconfigured`] when the rendered URL is invalid.
    pub fn lookup_url(&self, candidate: &UserId) -> Result<Url, OracleError> {
        render_url(&self.config.url_template, candidate.as_str())
            .map_err(|message| OracleError::misconfigured(&self.oracle_id, message))
    }
}

impl ExistenceOracle for HttpLookupOracle {
    fn oracle_id(&self) -> &str {
        &self.oracle_id
    }

    fn exists(&self, candidate: &UserId) -> Result<bool, OracleError> {
        let url = self.lookup_url(candidate)?;
        let mut request = self.client.get(url).header(ACCEPT, "application/json");
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        let mut response = request.send().map_err(|err| {
            let message =
                if err.is_timeout() { "http request timed out" } else { "http request failed" };
            OracleError::unavailable(&self.oracle_id, message)
        })?;

        let status = response.status();
        if self.config.absent_statuses.contains(&status.as_u16()) {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(OracleError::unavailable(
                &self.oracle_id,
                format!("unexpected http status {}", status.as_u16()),
            ));
        }
        let Some(pointer) = &self.config.result_pointer else {
            return Ok(true);
        };

        let body = read_response_limited(&mut response, self.config.max_response_bytes)
            .map_err(|message| OracleError::unavailable(&self.oracle_id, message))?;
        let document: Value = serde_json::from_slice(&body)
            .map_err(|_| OracleError::unavailable(&self.oracle_id, "response is not valid json"))?;
        Ok(indicates_presence(document.pointer(pointer)))
    }
}

// ============================================================================
// SECTION: Presence Classification
// ============================================================================

/// Returns true when a selected JSON value indicates an existing identifier.
///
/// Missing, `null`, `false`, zero, empty strings, empty arrays, and empty
/// objects mean absent; everything else means present.
#[must_use]
pub fn indicates_presence(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|value| value > 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(fields)) => !fields.is_empty(),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Checks that every status treated as "absent" is a 4xx client error.
///
/// # Errors
///
/// Returns a message naming the first status outside `400..=499`.
pub fn validate_absent_statuses(statuses: &BTreeSet<u16>) -> Result<(), String> {
    match statuses.iter().find(|status| !(400..=499).contains(*status)) {
        Some(status) => Err(format!("absent_statuses must be 4xx codes, got {status}")),
        None => Ok(()),
    }
}

/// Validates the URL template against scheme and allowlist policy.
fn validate_template(oracle_id: &str, config: &HttpLookupConfig) -> Result<(), OracleError> {
    if !config.url_template.contains(ID_PLACEHOLDER) {
        return Err(OracleError::misconfigured(oracle_id, "url_template must contain {id}"));
    }
    let first = render_url(&config.url_template, "a")
        .map_err(|message| OracleError::misconfigured(oracle_id, message))?;
    let second = render_url(&config.url_template, "z9")
        .map_err(|message| OracleError::misconfigured(oracle_id, message))?;
    if first.host_str() != second.host_str() || first.port() != second.port() {
        return Err(OracleError::misconfigured(oracle_id, "{id} must not appear in the host"));
    }
    match first.scheme() {
        "https" => {}
        "http" if config.allow_http => {}
        _ => return Err(OracleError::misconfigured(oracle_id, "unsupported url scheme")),
    }
    if !first.username().is_empty() || first.password().is_some() {
        return Err(OracleError::misconfigured(oracle_id, "url must not embed credentials"));
    }
    let host =
        first.host_str().ok_or_else(|| OracleError::misconfigured(oracle_id, "url host required"))?;
    if let Some(allowlist) = &config.allowed_hosts
        && !allowlist.contains(host)
    {
        return Err(OracleError::misconfigured(oracle_id, "url host not allowed"));
    }
    Ok(())
}

/// Substitutes the candidate into the template and parses the result.
fn render_url(template: &str, candidate: &str) -> Result<Url, String> {
    Url::parse(&template.replace(ID_PLACEHOLDER, candidate)).map_err(|_| "invalid url".to_string())
}

/// Reads a bearer token from the named environment variable.
fn read_token(oracle_id: &str, name: &str) -> Result<String, OracleError> {
    let token = env::var(name).map_err(|_| {
        OracleError::misconfigured(oracle_id, format!("bearer token env var {name} is not set"))
    })?;
    let token = token.trim();
    if token.is_empty() {
        return Err(OracleError::misconfigured(
            oracle_id,
            format!("bearer token env var {name} is empty"),
        ));
    }
    Ok(token.to_string())
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(response: &mut Response, max_bytes: usize) -> Result<Vec<u8>, String> {
    let max_bytes_u64 =
        u64::try_from(max_bytes).map_err(|_| "response size limit exceeds u64".to_string())?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err("http response exceeds size limit".to_string());
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle.read_to_end(&mut buf).map_err(|_| "failed to read response".to_string())?;
    if buf.len() > max_bytes {
        return Err("http response exceeds size limit".to_string());
    }
    Ok(buf)
}
