//! Exact parsing of decimal and fractional numerals.

use num::rational::Rational64;

/// Parse `"11"`, `"-9.2"`, `"46/5"` or `"-46/5"` into an exact rational.
///
/// Returns `None` on malformed input, a zero denominator, or overflow of
/// the 64-bit numerator/denominator.
pub fn parse_rational(text: &str) -> Option<Rational64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if digits.is_empty() || digits.starts_with('-') {
        return None;
    }

    let magnitude = if let Some((numer, denom)) = digits.split_once('/') {
        let numer = parse_decimal(numer)?;
        let denom = parse_decimal(denom)?;
        if denom == Rational64::from_integer(0) {
            return None;
        }
        numer / denom
    } else {
        parse_decimal(digits)?
    };

    Some(if negative { -magnitude } else { magnitude })
}

/// Unsigned decimal: `"7"`, `"7.5"`, `"7."`.
fn parse_decimal(text: &str) -> Option<Rational64> {
    let text = text.trim();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let mut numer: i64 = 0;
    for c in int_part.chars().chain(frac_part.chars()) {
        let digit = i64::from(c.to_digit(10)?);
        numer = numer.checked_mul(10)?.checked_add(digit)?;
    }
    let exponent = u32::try_from(frac_part.len()).ok()?;
    let denom = 10i64.checked_pow(exponent)?;
    Some(Rational64::new(numer, denom))
}
