//! Shared utilities for parsing, formatting and text handling.

// =============================================================================
// Numeric Utilities
// =============================================================================

/// Parse a string as a finite number.
///
/// Leading and trailing whitespace is ignored. Non-finite results ("NaN",
/// "inf") and empty strings are rejected.
///
/// # Example
///
/// ```rust,ignore
/// use datainsight_core::utils::parse_finite;
///
/// assert_eq!(parse_finite(" 42 "), Some(42.0));
/// assert_eq!(parse_finite("inf"), None);
/// ```
pub fn parse_finite(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a number the way it is shown as a category label.
///
/// Integral values have no fractional part and negative zero prints as "0".
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    format!("{}", n)
}

/// Arithmetic mean of a slice, `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

// =============================================================================
// Text Utilities
// =============================================================================

/// Number of characters (not bytes) in a string.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Keep at most `max_chars` characters, respecting UTF-8 boundaries.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_finite() {
        assert_eq!(parse_finite("3.25"), Some(3.25));
        assert_eq!(parse_finite("  -7 "), Some(-7.0));
        assert_eq!(parse_finite("1e2"), Some(100.0));
        assert_eq!(parse_finite(""), None);
        assert_eq!(parse_finite("   "), None);
        assert_eq!(parse_finite("12abc"), None);
        assert_eq!(parse_finite("NaN"), None);
        assert_eq!(parse_finite("-infinity"), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-3.0), "-3");
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[10.0, 30.0]), Some(20.0));
    }

    #[test]
    fn test_truncate_chars_respects_multibyte() {
        assert_eq!(truncate_chars("análise", 3), "aná");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(char_len("ção"), 3);
    }
}
