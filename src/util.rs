// Utility helpers for parsing, rounding and rendering numbers.
//
// Raw CSV fields arrive as text; everything here turns them into typed
// values or back into display strings, so the rest of the code never has
// to deal with blank cells or formatting.
use num_format::{Locale, ToFormattedString};

/// Rendered in place of a value that does not exist.
pub const PLACEHOLDER: &str = "—";

/// Parse a share-like cell into `f64`.
///
/// - Trims whitespace.
/// - Rejects anything with alphabetic characters (`NaN`, `inf`, `n/a`).
/// - Rejects separators: `5,5` is malformed, not `55`.
/// - Returns `None` for anything that cannot be parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic() || c == ',') {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Whole numbers only; a trailing `.0` (`2023.0`) is still whole.
pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i32>() {
        return Some(v);
    }
    let v = parse_f64_safe(Some(s))?;
    if v.fract() != 0.0 || v < i32::MIN as f64 || v > i32::MAX as f64 {
        return None;
    }
    Some(v as i32)
}

/// Blank cells and the literal `null` both mean "no value".
pub fn is_null_marker(s: Option<&str>) -> bool {
    match s.map(str::trim) {
        None => true,
        Some(v) => v.is_empty() || v.eq_ignore_ascii_case("null"),
    }
}

pub fn average(v: &[f64]) -> f64 {
    // Returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Round to one decimal place, halves towards positive infinity.
pub fn round1(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus thousands separators, e.g. `1,234.5`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// `55.0%`, or the placeholder when the value is absent.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}%", format_number(v, 1)),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Percentage-point change with an explicit sign, e.g. `+15.0 pp`.
pub fn format_change(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let sign = if v > 0.0 { "+" } else { "" };
            format!("{}{} pp", sign, format_number(v, 1))
        }
        _ => PLACEHOLDER.to_string(),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f64_rejects_text_and_blanks() {
        assert_eq!(parse_f64_safe(Some(" 42.5 ")), Some(42.5));
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn parse_f64_rejects_separators() {
        assert_eq!(parse_f64_safe(Some("5,5")), None);
        assert_eq!(parse_f64_safe(Some("1,000")), None);
        assert_eq!(parse_f64_safe(Some("5.5")), Some(5.5));
    }

    #[test]
    fn parse_i32_rejects_fractions() {
        assert_eq!(parse_i32_safe(Some("2023")), Some(2023));
        assert_eq!(parse_i32_safe(Some("2023.0")), Some(2023));
        assert_eq!(parse_i32_safe(Some("2023.5")), None);
        assert_eq!(parse_i32_safe(Some("abc")), None);
    }

    #[test]
    fn null_markers() {
        assert!(is_null_marker(None));
        assert!(is_null_marker(Some("  ")));
        assert!(is_null_marker(Some("null")));
        assert!(!is_null_marker(Some("0")));
    }

    #[test]
    fn round1_rounds_half_up() {
        assert_eq!(round1(12.34), 12.3);
        assert_eq!(round1(12.35), 12.4);
        assert_eq!(round1(-0.25), -0.2);
        assert_eq!(round1(50.0), 50.0);
    }

    #[test]
    fn average_of_empty_is_zero() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[90.0, 10.0]), 50.0);
    }

    #[test]
    fn formatting_uses_placeholder_for_missing_values() {
        assert_eq!(format_percent(Some(55.0)), "55.0%");
        assert_eq!(format_percent(None), PLACEHOLDER);
        assert_eq!(format_change(Some(15.0)), "+15.0 pp");
        assert_eq!(format_change(Some(-2.26)), "-2.3 pp");
        assert_eq!(format_change(None), PLACEHOLDER);
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_int(9855), "9,855");
    }
}
