//! # Numeric Input
//!
//! Conversion of user-typed text into ledger amounts.
//!
//! Two policies exist side by side:
//! - `parse_lenient` accepts the longest numeric prefix and yields NaN when
//!   there is none. NaN is NOT trapped: it flows through derived fields and
//!   aggregate sums exactly like any other value.
//! - `parse_strict` rejects anything that is not a complete number with
//!   `LedgerError::Parse`.
//!
//! NaN is persisted as JSON `null`; `nullable_f64` reads `null` back as NaN so
//! a save -> load -> save cycle is stable.

use crate::LedgerError;
use serde::{Deserialize, Deserializer};

/// Parse the longest leading decimal number of `input`.
///
/// Leading whitespace is skipped. `"12.5kg"` yields `12.5`, `"abc"` and `""`
/// yield NaN, `"Infinity"` yields positive infinity.
#[must_use]
pub fn parse_lenient(input: &str) -> f64 {
    let trimmed = input.trim_start();
    let end = numeric_prefix_len(trimmed);
    if end == 0 {
        return f64::NAN;
    }
    trimmed[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// Parse `input` as a complete number, rejecting trailing garbage.
///
/// `field` names the value in the error message.
pub fn parse_strict(field: &str, input: &str) -> Result<f64, LedgerError> {
    let trimmed = input.trim();
    if !trimmed.is_empty() && numeric_prefix_len(trimmed) == trimmed.len() {
        if let Ok(value) = trimmed.parse::<f64>() {
            return Ok(value);
        }
    }
    Err(LedgerError::Parse {
        field: field.to_string(),
        input: input.to_string(),
    })
}

/// Length in bytes of the numeric prefix of `s`, or 0 if there is none.
///
/// Grammar: `[+-]? (Infinity | digits [. digits?] | . digits) ([eE] [+-]? digits)?`
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    if s[i..].starts_with("Infinity") {
        return i + "Infinity".len();
    }

    let int_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    let mut digits = i - int_start;

    if bytes.get(i) == Some(&b'.') {
        let frac_start = i + 1;
        let mut j = frac_start;
        while bytes.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }

    if digits == 0 {
        return 0;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while bytes.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    i
}

/// Deserialize an amount, mapping JSON `null` to NaN.
///
/// For use as `#[serde(deserialize_with = "crate::numeric::nullable_f64")]`.
pub fn nullable_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

// =============================================================================
// TESTS
// =============================================================================
