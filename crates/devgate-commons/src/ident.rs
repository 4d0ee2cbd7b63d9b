//! Identifier and bound-checking helpers shared by the security validator and
//! the tool handlers (spec.md §4.1 "Identifier validation").

const MAX_PROJECT_ID_LEN: usize = 100;
const MAX_QUERY_LEN: usize = 10_000;

/// Upper bound applied to any caller-supplied `limit` argument (spec.md §4.1
/// "Numeric limits are clamped to `[1, maxValue]`").
pub const MAX_RESULT_LIMIT: i64 = 50;

/// `[A-Za-z0-9_-]{1,100}` without pulling in a regex for a single check.
pub fn is_valid_project_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_PROJECT_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Non-empty and at most 10,000 characters.
pub fn is_valid_query(query: &str) -> bool {
    !query.is_empty() && query.chars().count() <= MAX_QUERY_LEN
}

/// Clamp a caller-supplied numeric limit into `[1, max_value]`.
pub fn clamp_limit(value: i64, max_value: i64) -> i64 {
    value.clamp(1, max_value)
}
