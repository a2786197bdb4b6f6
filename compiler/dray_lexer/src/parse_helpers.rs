//! Numeric literal cooking.
//!
//! The raw scanner has already validated the shape; these helpers strip
//! underscores, fold the base prefix, and split off the suffix.

use dray_ir::{FloatSuffix, IntSuffix};

/// Cook an integer literal slice (decimal, hex, or binary, with optional
/// `u`/`U`/`L` suffix combination). Returns `None` on overflow.
pub(crate) fn cook_int(slice: &str) -> Option<(u64, IntSuffix)> {
    let (digits, suffix) = split_int_suffix(slice);

    let (radix, body) = if let Some(rest) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        (16, rest)
    } else if let Some(rest) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        (2, rest)
    } else {
        (10, digits)
    };

    let mut value: u64 = 0;
    for c in body.chars() {
        if c == '_' {
            continue;
        }
        let digit = c.to_digit(radix)?;
        value = value
            .checked_mul(u64::from(radix))?
            .checked_add(u64::from(digit))?;
    }
    Some((value, suffix))
}

fn split_int_suffix(slice: &str) -> (&str, IntSuffix) {
    let bytes = slice.as_bytes();
    let mut end = bytes.len();
    let mut unsigned = false;
    let mut long = false;

    while end > 0 {
        match bytes[end - 1] {
            b'u' | b'U' if !unsigned => {
                unsigned = true;
                end -= 1;
            }
            b'L' if !long => {
                long = true;
                end -= 1;
            }
            _ => break,
        }
    }

    let suffix = match (unsigned, long) {
        (false, false) => IntSuffix::None,
        (true, false) => IntSuffix::Unsigned,
        (false, true) => IntSuffix::Long,
        (true, true) => IntSuffix::UnsignedLong,
    };
    (&slice[..end], suffix)
}

/// Cook a float literal slice with optional `f`/`F`/`L` suffix.
/// Returns `None` if the payload does not parse (malformed exponent).
pub(crate) fn cook_float(slice: &str) -> Option<(f64, FloatSuffix)> {
    let (body, suffix) = match slice.as_bytes().last() {
        Some(b'f' | b'F') => (&slice[..slice.len() - 1], FloatSuffix::Float),
        Some(b'L') => (&slice[..slice.len() - 1], FloatSuffix::Real),
        _ => (slice, FloatSuffix::None),
    };
    let cleaned: String = body.chars().filter(|&c| c != '_').collect();
    cleaned.parse::<f64>().ok().map(|v| (v, suffix))
}
