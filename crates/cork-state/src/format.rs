use cork_types::{CorkError, StateEntry};

/// `key=value`
pub fn render_entry(key: &str, value: &str) -> String {
    format!("{key}={value}")
}

/// Newline-joined `key=value` lines, no trailing newline. Empty input renders
/// as the empty string.
pub fn render_entries(entries: &[StateEntry]) -> String {
    entries
        .iter()
        .map(|e| render_entry(&e.key, &e.value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split a `KEY=VALUE` token on its first `=`.
///
/// The value may be empty and may itself contain `=`. A token without any `=`
/// is rejected with [`CorkError::MalformedInput`].
pub fn parse_assignment(token: &str) -> Result<(String, String), CorkError> {
    token
        .split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| CorkError::MalformedInput(token.to_string()))
}
