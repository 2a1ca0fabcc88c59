//! Scalar grammars of the YAML 1.2 core schema.
//!
//! Keywords are matched case-insensitively. Integers accept an optional sign and the
//! `0x` / `0o` radix prefixes; digit separators (`_`) and YAML 1.1 forms are not accepted.

/// Result of matching a plain scalar against the integer grammar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum IntParse {
    /// Fits in `i64`.
    Int(i64),
    /// Well-formed but out of `i64` range; carries the nearest `f64`.
    Overflow(f64),
}

pub(crate) fn is_null(s: &str) -> bool {
    s.is_empty() || s == "~" || s.eq_ignore_ascii_case("null")
}

pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Accumulate `digits` in `radix`, in `i128` and, on overflow, in `f64`.
fn parse_digits(digits: &str, radix: u32) -> Option<(Option<i128>, f64)> {
    if digits.is_empty() {
        return None;
    }
    let mut exact: Option<i128> = Some(0);
    let mut approx = 0f64;
    for c in digits.chars() {
        let d = c.to_digit(radix)?;
        exact = exact
            .and_then(|v| v.checked_mul(radix as i128))
            .and_then(|v| v.checked_add(d as i128));
        approx = approx * radix as f64 + d as f64;
    }
    Some((exact, approx))
}

pub(crate) fn parse_int(s: &str) -> Option<IntParse> {
    let (neg, rest) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = if let Some(r) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        (16, r)
    } else if let Some(r) = rest.strip_prefix("0o").or_else(|| rest.strip_prefix("0O")) {
        (8, r)
    } else {
        (10, rest)
    };
    let (exact, approx) = parse_digits(digits, radix)?;
    let signed = exact.map(|v| if neg { -v } else { v });
    match signed.and_then(|v| i64::try_from(v).ok()) {
        Some(v) => Some(IntParse::Int(v)),
        None => Some(IntParse::Overflow(if neg { -approx } else { approx })),
    }
}

/// Match the core float grammar (including `.inf` / `.nan`) and convert.
pub(crate) fn parse_float(s: &str) -> Option<f64> {
    let (neg, body) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    if body.eq_ignore_ascii_case(".inf") {
        return Some(if neg { f64::NEG_INFINITY } else { f64::INFINITY });
    }
    if body.eq_ignore_ascii_case(".nan") {
        return (s.len() == body.len()).then_some(f64::NAN);
    }
    if !matches_float_grammar(body) {
        return None;
    }
    s.parse::<f64>().ok()
}

/// `( \. [0-9]+ | [0-9]+ ( \. [0-9]* )? ) ( [eE] [-+]? [0-9]+ )?` on an unsigned body.
fn matches_float_grammar(body: &str) -> bool {
    let bytes = body.as_bytes();
    let mut i = 0;
    let int_digits = count_digits(&bytes[i..]);
    i += int_digits;
    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        frac_digits = count_digits(&bytes[i..]);
        i += frac_digits;
    }
    if int_digits == 0 && frac_digits == 0 {
        return false;
    }
    if matches!(bytes.get(i), Some(b'e') | Some(b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
            i += 1;
        }
        let exp_digits = count_digits(&bytes[i..]);
        if exp_digits == 0 {
            return false;
        }
        i += exp_digits;
    }
    i == bytes.len()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls() {
        for s in ["", "~", "null", "Null", "NULL", "nUlL"] {
            assert!(is_null(s), "{s}");
        }
        assert!(!is_null("nil"));
    }

    #[test]
    fn bools() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("False"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn ints() {
        assert_eq!(parse_int("42"), Some(IntParse::Int(42)));
        assert_eq!(parse_int("-17"), Some(IntParse::Int(-17)));
        assert_eq!(parse_int("+5"), Some(IntParse::Int(5)));
        assert_eq!(parse_int("0x1F"), Some(IntParse::Int(31)));
        assert_eq!(parse_int("0o17"), Some(IntParse::Int(15)));
        assert_eq!(parse_int("-0x10"), Some(IntParse::Int(-16)));
        assert_eq!(parse_int("001"), Some(IntParse::Int(1)));
        assert_eq!(parse_int("-9223372036854775808"), Some(IntParse::Int(i64::MIN)));
        assert!(matches!(parse_int("99999999999999999999"), Some(IntParse::Overflow(_))));
        for bad in ["", "-", "0x", "1_000", "0b101", "12a", "0o8", "1.0"] {
            assert_eq!(parse_int(bad), None, "{bad}");
        }
    }

    #[test]
    fn floats() {
        assert_eq!(parse_float("1.5"), Some(1.5));
        assert_eq!(parse_float("-.5"), Some(-0.5));
        assert_eq!(parse_float("1."), Some(1.0));
        assert_eq!(parse_float("1e3"), Some(1000.0));
        assert_eq!(parse_float("6.02E+23"), Some(6.02e23));
        assert_eq!(parse_float(".INF"), Some(f64::INFINITY));
        assert_eq!(parse_float("-.inf"), Some(f64::NEG_INFINITY));
        assert!(parse_float(".NaN").is_some_and(f64::is_nan));
        for bad in [".", "e3", "1e", "inf", "nan", "-.nan", "1.2.3", "0x1p3", "1_0.0"] {
            assert_eq!(parse_float(bad), None, "{bad}");
        }
    }
}
