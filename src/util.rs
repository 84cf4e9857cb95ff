//! Small helpers shared by the config loader and the intercept paths.

/// Parse the leading integer of a string the way lenient clients do.
///
/// Leading whitespace and a single sign are accepted; parsing stops at the
/// first non-digit. `"1000"`, `" 42 "` and `"1000abc"` all parse, `"abc"` and
/// `""` do not.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Truncate a float timestamp to whole seconds. `None` for NaN, infinities
/// and anything outside the `i64` range.
pub fn whole_seconds(f: f64) -> Option<i64> {
    // 2^63: the smallest float above i64::MAX
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    let whole = f.trunc();
    if whole.is_finite() && whole >= i64::MIN as f64 && whole < UPPER {
        Some(whole as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("1000"), Some(1000));
        assert_eq!(parse_int_prefix("  -15"), Some(-15));
        assert_eq!(parse_int_prefix("+7"), Some(7));
        assert_eq!(parse_int_prefix("1000abc"), Some(1000));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
    }

    #[test]
    fn test_whole_seconds() {
        assert_eq!(whole_seconds(1700000000.9), Some(1_700_000_000));
        assert_eq!(whole_seconds(-2.5), Some(-2));
        assert_eq!(whole_seconds(1e300), None);
        assert_eq!(whole_seconds(-1e300), None);
        assert_eq!(whole_seconds(f64::NAN), None);
        assert_eq!(whole_seconds(9_223_372_036_854_775_808.0), None);
    }
}
