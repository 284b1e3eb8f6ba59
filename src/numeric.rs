//! Number coercion with browser semantics.
//!
//! Quantities and prices arrive as user-visible text, so they are coerced the
//! way a page script would coerce them: `parseInt(s, 10)` for integer-only
//! quantities, `Number(s)` otherwise, and the usual number-to-string rules
//! when values are written back into the page.

/// Offset between a full-width digit (U+FF10..=U+FF19) and its ASCII form.
const FULLWIDTH_OFFSET: u32 = 0xFEE0;

/// Replace full-width digits `０`-`９` with ASCII `0`-`9`.
///
/// Other full-width characters (signs, dots) are left alone.
#[must_use]
pub fn normalize_digits(s: &str) -> String {
    s.chars()
        .map(|ch| {
            if ('\u{FF10}'..='\u{FF19}').contains(&ch) {
                char::from_u32(u32::from(ch) - FULLWIDTH_OFFSET).unwrap_or(ch)
            } else {
                ch
            }
        })
        .collect()
}

/// Whitespace as trimmed by `parseInt` / `Number`.
fn is_js_space(ch: char) -> bool {
    ch.is_whitespace() || ch == '\u{FEFF}'
}

/// `parseInt(s, 10)`: optional sign followed by the longest run of ASCII
/// digits. Returns NaN if there are no digits.
#[must_use]
pub fn parse_int(s: &str) -> f64 {
    let s = s.trim_start_matches(is_js_space);
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, s.get(1..).unwrap_or("")),
        Some(b'+') => (false, s.get(1..).unwrap_or("")),
        _ => (false, s),
    };
    let end = rest
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = rest.get(..end).unwrap_or("");
    if digits.is_empty() {
        return f64::NAN;
    }
    let value = digits.parse::<f64>().unwrap_or(f64::NAN);
    if negative {
        -value
    } else {
        value
    }
}

/// `Number(s)` for string input. Empty or all-whitespace text is 0;
/// anything that is not a complete numeric literal is NaN.
#[must_use]
pub fn to_number(s: &str) -> f64 {
    let s = s.trim_matches(is_js_space);
    if s.is_empty() {
        return 0.0;
    }

    if let Some(value) = parse_radix_literal(s) {
        return value;
    }

    let (sign, body) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, s.get(1..).unwrap_or("")),
        Some(b'+') => (1.0, s.get(1..).unwrap_or("")),
        _ => (1.0, s),
    };
    if body == "Infinity" {
        return sign * f64::INFINITY;
    }
    if !is_decimal_literal(body) {
        return f64::NAN;
    }
    body.parse::<f64>().map_or(f64::NAN, |v| sign * v)
}

/// `0x`, `0o` and `0b` literals. Signs are not allowed in front of these.
fn parse_radix_literal(s: &str) -> Option<f64> {
    let prefix = s.get(..2)?.to_ascii_lowercase();
    let radix = match prefix.as_str() {
        "0x" => 16,
        "0o" => 8,
        "0b" => 2,
        _ => return None,
    };
    let digits = s.get(2..)?;
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_digit(radix)) {
        return Some(f64::NAN);
    }
    let value = digits.chars().fold(0.0_f64, |acc, ch| {
        acc * f64::from(radix) + f64::from(ch.to_digit(radix).unwrap_or(0))
    });
    Some(value)
}

/// Unsigned decimal literal: `digits [. digits] [e [sign] digits]`, with at
/// least one mantissa digit (`"1."` and `".5"` are both valid).
fn is_decimal_literal(s: &str) -> bool {
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(pos) => (s.get(..pos).unwrap_or(""), s.get(pos + 1..)),
        None => (s, None),
    };

    let mut seen_dot = false;
    let mut seen_digit = false;
    for ch in mantissa.chars() {
        match ch {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    if !seen_digit {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp
                .strip_prefix('+')
                .or_else(|| exp.strip_prefix('-'))
                .unwrap_or(exp);
            !exp.is_empty() && exp.chars().all(|ch| ch.is_ascii_digit())
        }
    }
}

/// Coerce a raw quantity entry: normalize full-width digits, parse, and map
/// NaN to 0.
#[must_use]
pub fn coerce_quantity(raw: &str, only_integer: bool) -> f64 {
    let normalized = normalize_digits(raw);
    let value = if only_integer {
        parse_int(&normalized)
    } else {
        to_number(&normalized)
    };
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Number-to-string as a page script would render it.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }
    if value == 0.0 {
        // Also covers -0.
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{value}");
    }

    let sci = format!("{value:e}");
    match sci.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => sci,
    }
}
