//! Double to ASCII conversion, and back
//!
//! ECMAScript-style text forms for IEEE-754 doubles: `NaN`, signed
//! `Infinity`, integer printing without a trailing `.0`, and e-notation for
//! magnitudes at or above 1e21 or below 1e-6. The reverse direction parses
//! numeric string literals (decimal and `0x` hex) the way the `Number`
//! coercion expects, yielding NaN for anything else.

/// Convert a double to its ECMAScript decimal text form.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // both zeros print as "0"
        return "0".to_string();
    }

    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        return exponential_form(n);
    }
    if n == n.trunc() {
        // integral values inside the non-exponent range print without a
        // fraction part
        return format!("{:.0}", n);
    }
    // shortest round-trip representation
    format!("{}", n)
}

/// Render in JS exponent style: `1e+21`, `1.5e-7`.
fn exponential_form(n: f64) -> String {
    let s = format!("{:e}", n);
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => s,
    }
}

/// Parse a numeric string literal.
///
/// Accepts optional surrounding whitespace, `0x`/`0X` hex forms, signed
/// decimal literals, and signed `Infinity`. Everything else (including the
/// empty string — the version-gated legacy zero is the caller's business)
/// yields NaN.
pub fn str_to_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return f64::NAN;
    }

    if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        return parse_hex(hex);
    }

    let (sign, rest) = match t.strip_prefix('-') {
        Some(r) => (-1.0, r),
        None => (1.0, t.strip_prefix('+').unwrap_or(t)),
    };
    if rest == "Infinity" {
        return sign * f64::INFINITY;
    }
    if !is_decimal_literal(rest) {
        return f64::NAN;
    }
    match rest.parse::<f64>() {
        Ok(v) => sign * v,
        Err(_) => f64::NAN,
    }
}

fn parse_hex(digits: &str) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut v = 0.0f64;
    for b in digits.bytes() {
        let d = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => return f64::NAN,
        };
        v = v * 16.0 + d as f64;
    }
    v
}

/// Check for `digits [. digits] [eE [sign] digits]` with at least one
/// mantissa digit. Rust's `f64::from_str` accepts forms like `inf` and
/// `nan` that a numeric literal must reject, so validation happens first.
fn is_decimal_literal(s: &str) -> bool {
    let b = s.as_bytes();
    let mut i = 0;
    let mut mantissa_digits = false;

    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
        mantissa_digits = true;
    }
    if i < b.len() && b[i] == b'.' {
        i += 1;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
            mantissa_digits = true;
        }
    }
    if !mantissa_digits {
        return false;
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        i += 1;
        if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
            i += 1;
        }
        let mut exp_digits = false;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
            exp_digits = true;
        }
        if !exp_digits {
            return false;
        }
    }
    i == b.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_to_string_specials() {
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::INFINITY), "Infinity");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(number_to_string(0.0), "0");
        assert_eq!(number_to_string(-0.0), "0");
    }

    #[test]
    fn test_number_to_string_integers() {
        assert_eq!(number_to_string(1.0), "1");
        assert_eq!(number_to_string(-42.0), "-42");
        assert_eq!(number_to_string(1e20), "100000000000000000000");
    }

    #[test]
    fn test_number_to_string_fractions() {
        assert_eq!(number_to_string(0.5), "0.5");
        assert_eq!(number_to_string(-1.25), "-1.25");
        assert_eq!(number_to_string(0.1), "0.1");
    }

    #[test]
    fn test_number_to_string_exponent() {
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(-1.5e22), "-1.5e+22");
        assert_eq!(number_to_string(1e-7), "1e-7");
    }

    #[test]
    fn test_str_to_number_decimal() {
        assert_eq!(str_to_number("42"), 42.0);
        assert_eq!(str_to_number("  -3.5  "), -3.5);
        assert_eq!(str_to_number("+0.25"), 0.25);
        assert_eq!(str_to_number("1e3"), 1000.0);
        assert_eq!(str_to_number("2.5E-1"), 0.25);
        assert_eq!(str_to_number(".5"), 0.5);
        assert_eq!(str_to_number("3."), 3.0);
    }

    #[test]
    fn test_str_to_number_hex_and_infinity() {
        assert_eq!(str_to_number("0xff"), 255.0);
        assert_eq!(str_to_number("0X10"), 16.0);
        assert_eq!(str_to_number("Infinity"), f64::INFINITY);
        assert_eq!(str_to_number("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_str_to_number_rejects() {
        assert!(str_to_number("").is_nan());
        assert!(str_to_number("   ").is_nan());
        assert!(str_to_number("12px").is_nan());
        assert!(str_to_number("e5").is_nan());
        assert!(str_to_number("1e").is_nan());
        assert!(str_to_number("0xzz").is_nan());
        assert!(str_to_number("inf").is_nan());
        assert!(str_to_number("nan").is_nan());
        assert!(str_to_number("1 2").is_nan());
    }
}
