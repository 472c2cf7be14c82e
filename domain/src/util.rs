//! Shared utility functions.

/// Truncate a string to at most `max_bytes` without splitting a UTF-8
/// character boundary. Returns a sub-slice of the original string.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Truncate for display, appending an ellipsis when anything was cut.
/// Used for point-title derivation and log previews.
pub fn preview(s: &str, max_bytes: usize) -> String {
    let cut = truncate_str(s, max_bytes);
    if cut.len() < s.len() {
        format!("{}…", cut.trim_end())
    } else {
        cut.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_string_is_identity() {
        assert_eq!(truncate_str("Selah", 32), "Selah");
        assert_eq!(truncate_str("", 8), "");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        // '—' (em dash) is 3 bytes; cutting inside it must back up.
        let s = "grace—mercy";
        assert_eq!(truncate_str(s, 6), "grace");
        assert_eq!(truncate_str(s, 8), "grace—");
    }

    #[test]
    fn preview_appends_ellipsis_only_when_cut() {
        assert_eq!(preview("For God so loved the world", 11), "For God so…");
        assert_eq!(preview("Amen", 10), "Amen");
    }
}
