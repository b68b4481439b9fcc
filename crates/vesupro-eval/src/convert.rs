//! Numeric conversions with Go `strconv` semantics.
//!
//! Base 10 only, as the generated code calls them. A bit width of `0`
//! means 64. Unsigned parsing rejects any sign; signed parsing accepts a
//! single leading `+` or `-`. Out-of-range values are errors, never
//! truncated. Hexadecimal float literals are not accepted.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NumErrorKind {
    #[error("invalid syntax")]
    Syntax,
    #[error("value out of range")]
    Range,
}

/// A failed conversion, worded like `*strconv.NumError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("strconv.{func}: parsing {text:?}: {kind}")]
pub struct NumError {
    pub func: &'static str,
    pub text: String,
    pub kind: NumErrorKind,
}

impl NumError {
    fn new(func: &'static str, text: &str, kind: NumErrorKind) -> Self {
        Self {
            func,
            text: text.to_string(),
            kind,
        }
    }
}

fn width(bits: u8) -> u32 {
    match bits {
        0 => 64,
        b => u32::from(b.min(64)),
    }
}

/// `strconv.ParseUint(text, 10, bits)`
pub fn parse_uint(text: &str, bits: u8) -> Result<u64, NumError> {
    const FUNC: &str = "ParseUint";
    if text.is_empty() {
        return Err(NumError::new(FUNC, text, NumErrorKind::Syntax));
    }
    let mut value: u64 = 0;
    for c in text.chars() {
        let Some(digit) = c.to_digit(10) else {
            return Err(NumError::new(FUNC, text, NumErrorKind::Syntax));
        };
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(digit)))
            .ok_or_else(|| NumError::new(FUNC, text, NumErrorKind::Range))?;
    }
    let bits = width(bits);
    if bits < 64 && value >> bits != 0 {
        return Err(NumError::new(FUNC, text, NumErrorKind::Range));
    }
    Ok(value)
}

/// `strconv.ParseInt(text, 10, bits)`
pub fn parse_int(text: &str, bits: u8) -> Result<i64, NumError> {
    const FUNC: &str = "ParseInt";
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = parse_uint(digits, 64).map_err(|e| NumError::new(FUNC, text, e.kind))?;

    let limit = 1u64 << (width(bits) - 1);
    if negative {
        if magnitude > limit {
            return Err(NumError::new(FUNC, text, NumErrorKind::Range));
        }
        // -limit does not fit in i64 for 64 bits, so go through i128
        Ok((-(i128::from(magnitude))) as i64)
    } else {
        if magnitude >= limit {
            return Err(NumError::new(FUNC, text, NumErrorKind::Range));
        }
        Ok(magnitude as i64)
    }
}

/// `strconv.ParseFloat(text, bits)`; 32-bit results are rounded to `f32`.
pub fn parse_float(text: &str, bits: u8) -> Result<f64, NumError> {
    const FUNC: &str = "ParseFloat";
    let syntax = || NumError::new(FUNC, text, NumErrorKind::Syntax);
    if text.contains('_') {
        return Err(syntax());
    }
    let value = if width(bits) == 32 {
        f64::from(text.parse::<f32>().map_err(|_| syntax())?)
    } else {
        text.parse::<f64>().map_err(|_| syntax())?
    };
    if value.is_infinite() && !names_infinity(text) {
        return Err(NumError::new(FUNC, text, NumErrorKind::Range));
    }
    Ok(value)
}

fn names_infinity(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint_widths() {
        assert_eq!(parse_uint("65535", 16), Ok(65535));
        assert_eq!(parse_uint("65536", 16).unwrap_err().kind, NumErrorKind::Range);
        assert_eq!(parse_uint("18446744073709551615", 0), Ok(u64::MAX));
        assert_eq!(
            parse_uint("18446744073709551616", 64).unwrap_err().kind,
            NumErrorKind::Range
        );
    }

    #[test]
    fn test_uint_rejects_signs_and_junk() {
        for text in ["", "+1", "-1", "1_000", "0x10", "1.0", " 1"] {
            assert_eq!(parse_uint(text, 64).unwrap_err().kind, NumErrorKind::Syntax, "{text:?}");
        }
    }

    #[test]
    fn test_int_bounds() {
        assert_eq!(parse_int("-128", 8), Ok(-128));
        assert_eq!(parse_int("127", 8), Ok(127));
        assert_eq!(parse_int("+127", 8), Ok(127));
        assert_eq!(parse_int("128", 8).unwrap_err().kind, NumErrorKind::Range);
        assert_eq!(parse_int("-129", 8).unwrap_err().kind, NumErrorKind::Range);
        assert_eq!(parse_int("-9223372036854775808", 0), Ok(i64::MIN));
        assert_eq!(parse_int("9223372036854775808", 64).unwrap_err().kind, NumErrorKind::Range);
        assert_eq!(parse_int("-", 64).unwrap_err().kind, NumErrorKind::Syntax);
        assert_eq!(parse_int("--1", 64).unwrap_err().kind, NumErrorKind::Syntax);
    }

    #[test]
    fn test_float() {
        assert_eq!(parse_float("1.5", 64), Ok(1.5));
        assert_eq!(parse_float("-2e3", 64), Ok(-2000.0));
        assert_eq!(parse_float("0.1", 32), Ok(f64::from(0.1f32)));
        assert_eq!(parse_float("+Inf", 64), Ok(f64::INFINITY));
        assert_eq!(parse_float("1e40", 32).unwrap_err().kind, NumErrorKind::Range);
        assert_eq!(parse_float("1e400", 64).unwrap_err().kind, NumErrorKind::Range);
        assert_eq!(parse_float("abc", 64).unwrap_err().kind, NumErrorKind::Syntax);
        assert!(parse_float("NaN", 64).is_ok_and(f64::is_nan));
    }

    #[test]
    fn test_error_wording() {
        let err = parse_uint("abc", 16).unwrap_err();
        assert_eq!(err.to_string(), "strconv.ParseUint: parsing \"abc\": invalid syntax");
        let err = parse_int("300", 8).unwrap_err();
        assert_eq!(err.to_string(), "strconv.ParseInt: parsing \"300\": value out of range");
    }
}
