// crates/idgen-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and `idgen config example`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `idgen.toml`. The example is validated by the test
//! suite so it never drifts from the config model.

/// Returns a canonical example `idgen.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[batch]
on_oracle_failure = "abort"
pause_ms = 250
max_roster_entries = 10000
max_roster_bytes = 4194304
reserved_ids = ["admin", "root"]

[audit]
sink = "file"
path = "idgen-audit.jsonl"
log_candidates = false

[[oracles]]
name = "directory"
type = "http"
config = { url_template = "https://directory.example.edu/api/users/{id}", result_pointer = "/entries", bearer_token_env = "IDGEN_DIRECTORY_TOKEN", timeout_ms = 5000, allowed_hosts = ["directory.example.edu"] }

[[oracles]]
name = "database"
type = "sql"
config = { path = "/srv/idgen/accounts.db", query = "SELECT COUNT(*) FROM people WHERE lower(login) = ?1" }

[[oracles]]
name = "lms"
type = "sql"
config = { path = "/srv/idgen/lms.db", query = "SELECT COUNT(*) FROM mdl_user WHERE username = ?1", busy_timeout_ms = 2000 }

[[oracles]]
name = "groupware"
type = "http"
config = { url_template = "https://groupware.example.edu/admin/directory/v1/users?query=email:{id}@example.edu", result_pointer = "/users", bearer_token_env = "IDGEN_GROUPWARE_TOKEN", allowed_hosts = ["groupware.example.edu"] }

[[oracles]]
name = "reserved"
type = "list"
config = { path = "/etc/idgen/reserved.txt" }
"#,
    )
}
