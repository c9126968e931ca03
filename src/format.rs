// src/format.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Numeric interpretation of a cell value. Numbers pass through; strings are
/// accepted when they parse as a float.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

/// Raw text for a cell. Strings render unquoted, null renders blank.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Thousands-grouped decimal rendering with a fixed number of decimals.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::new();
    let digits = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Numeral-style pattern formatting. Supported pattern pieces: a leading `$`,
/// `,` for thousands grouping, decimals after `.`, a trailing `%` (value is
/// scaled by 100) and a trailing `a` (k/m/b/t abbreviation).
pub fn format_by_pattern(value: f64, pattern: &str) -> String {
    let mut body = pattern.trim();
    let mut prefix = "";
    let mut value = value;

    if let Some(rest) = body.strip_prefix('$') {
        prefix = "$";
        body = rest;
    }
    let mut percent = "";
    if let Some(rest) = body.strip_suffix('%') {
        percent = "%";
        value *= 100.0;
        body = rest;
    }
    let mut abbrev = "";
    if let Some(rest) = body.strip_suffix('a') {
        body = rest;
        let magnitude = value.abs();
        let (divisor, suffix) = if magnitude >= 1e12 {
            (1e12, "t")
        } else if magnitude >= 1e9 {
            (1e9, "b")
        } else if magnitude >= 1e6 {
            (1e6, "m")
        } else if magnitude >= 1e3 {
            (1e3, "k")
        } else {
            (1.0, "")
        };
        value /= divisor;
        abbrev = suffix;
    }

    let decimals = body
        .split_once('.')
        .map(|(_, frac)| frac.chars().filter(|c| *c == '0').count())
        .unwrap_or(0);

    let number = if body.contains(',') {
        format_grouped(value, decimals)
    } else {
        format!("{:.*}", decimals, value)
    };

    format!("{prefix}{number}{abbrev}{percent}")
}

/// Render a date cell: parse the raw value with `date_type` (moment-style
/// tokens, or a set of common layouts when absent) and reformat it with
/// `date_format`. Returns None when the value does not parse, in which case
/// the caller falls back to the raw text.
pub fn format_date(raw: &str, date_type: Option<&str>, date_format: &str) -> Option<String> {
    let parsed = parse_date(raw, date_type)?;
    Some(parsed.format(&moment_to_chrono(date_format)).to_string())
}

fn parse_date(raw: &str, date_type: Option<&str>) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(layout) = date_type.filter(|l| !l.is_empty()) {
        let layout = moment_to_chrono(layout);
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, &layout) {
            return Some(dt);
        }
        if let Ok(d) = NaiveDate::parse_from_str(raw, &layout) {
            return d.and_hms_opt(0, 0, 0);
        }
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for layout in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Translate moment.js format tokens (the dialect the persisted column specs
/// use) into chrono strftime specifiers. Unknown characters pass through.
fn moment_to_chrono(layout: &str) -> String {
    const TOKENS: [(&str, &str); 18] = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("M", "%-m"),
        ("DD", "%d"),
        ("D", "%-d"),
        ("dddd", "%A"),
        ("ddd", "%a"),
        ("HH", "%H"),
        ("H", "%-H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("m", "%-M"),
        ("ss", "%S"),
        ("A", "%p"),
        ("a", "%P"),
    ];
    let mut out = String::with_capacity(layout.len());
    let mut rest = layout;
    'outer: while !rest.is_empty() {
        for (token, spec) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = tail;
                continue 'outer;
            }
        }
        let ch = rest.chars().next().unwrap();
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_detection() {
        assert_eq!(numeric_value(&json!(12)), Some(12.0));
        assert_eq!(numeric_value(&json!(-3.5)), Some(-3.5));
        assert_eq!(numeric_value(&json!("42.5")), Some(42.5));
        assert_eq!(numeric_value(&json!(" 7 ")), Some(7.0));
        assert_eq!(numeric_value(&json!("abc")), None);
        assert_eq!(numeric_value(&json!("")), None);
        assert_eq!(numeric_value(&json!(null)), None);
        assert_eq!(numeric_value(&json!(true)), None);
    }

    #[test]
    fn cell_text_renders_scalars() {
        assert_eq!(cell_text(&json!("hi")), "hi");
        assert_eq!(cell_text(&json!(3)), "3");
        assert_eq!(cell_text(&json!(null)), "");
    }

    #[test]
    fn grouped_formatting() {
        assert_eq!(format_grouped(1234567.89, 0), "1,234,568");
        assert_eq!(format_grouped(1234.5, 2), "1,234.50");
        assert_eq!(format_grouped(999.0, 0), "999");
        assert_eq!(format_grouped(-1234.0, 0), "-1,234");
        assert_eq!(format_grouped(-0.001, 0), "0");
    }

    #[test]
    fn pattern_formatting() {
        assert_eq!(format_by_pattern(1234.5, "$0,0.00"), "$1,234.50");
        assert_eq!(format_by_pattern(0.1234, "0.00%"), "12.34%");
        assert_eq!(format_by_pattern(1234567.0, "0,0.00a"), "1.23m");
        assert_eq!(format_by_pattern(4321.0, "0.0a"), "4.3k");
        assert_eq!(format_by_pattern(12.0, "0a"), "12");
        assert_eq!(format_by_pattern(5e9, "0.00a"), "5.00b");
        assert_eq!(format_by_pattern(42.0, "0,0"), "42");
    }

    #[test]
    fn date_formatting_with_layout() {
        assert_eq!(
            format_date("2024-03-01", Some("YYYY-MM-DD"), "DD/MM/YYYY").as_deref(),
            Some("01/03/2024")
        );
        assert_eq!(
            format_date("01.03.2024 13:45", Some("DD.MM.YYYY HH:mm"), "YYYY-MM-DD HH:mm").as_deref(),
            Some("2024-03-01 13:45")
        );
        assert_eq!(format_date("not a date", Some("YYYY-MM-DD"), "DD"), None);
    }

    #[test]
    fn date_formatting_without_layout() {
        assert_eq!(
            format_date("2024-03-01T10:20:30Z", None, "MMM D, YYYY").as_deref(),
            Some("Mar 1, 2024")
        );
        assert_eq!(
            format_date("2024-03-01", None, "YYYY").as_deref(),
            Some("2024")
        );
    }
}
