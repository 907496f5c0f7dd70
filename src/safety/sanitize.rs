//! Formatting cleanup and the prefix safety check for model output.

/// Opening fence with a language tag, as models usually emit it.
const SQL_FENCE: &str = "```sql";

/// Bare fence, used to close a block or open an untagged one.
const BARE_FENCE: &str = "```";

/// Strips markdown code fences from model output and trims whitespace.
///
/// Every "```sql" and every "```" is removed wherever it occurs; nothing else
/// in the text changes. Idempotent: once all fences are gone no new fence can
/// appear, so a second pass finds nothing to strip.
pub fn clean(text: &str) -> String {
    text.replace(SQL_FENCE, "")
        .replace(BARE_FENCE, "")
        .trim()
        .to_string()
}

/// Returns true if the trimmed, lowercased text starts with `select`.
///
/// This only inspects the leading keyword. It does not parse the statement,
/// so `SELECT 1; DROP TABLE sales` passes; see
/// [`validate_read_only`](super::validate_read_only) for the strict check.
pub fn is_safe(text: &str) -> bool {
    text.trim().to_lowercase().starts_with("select")
}
