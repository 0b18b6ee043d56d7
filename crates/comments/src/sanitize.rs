//! Field sanitization for incoming comment records.
//!
//! Only identity fields (ids, author id, author name) are cleaned. Content
//! and the captured fingerprint pass through untouched: rewriting the
//! fingerprint would break its exact-prefix comparison.

/// Strips control characters (when enabled) and trims. Blank becomes `None`.
pub(crate) fn sanitize_optional_string(value: Option<String>, strip_control: bool) -> Option<String> {
    value.and_then(|raw| {
        let filtered = if strip_control {
            raw.chars().filter(|c| !c.is_control()).collect::<String>()
        } else {
            raw
        };
        let trimmed = filtered.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == filtered.len() {
            Some(filtered)
        } else {
            Some(trimmed.to_string())
        }
    })
}
