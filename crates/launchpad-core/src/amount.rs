//! Decimal amount parsing and formatting in exact integer base units.
//!
//! User input like `"1.5"` becomes `1_500_000_000` lamports (9 decimals);
//! no floating point is involved in either direction.

use crate::error::LaunchpadError;

/// Decimals of both SOL and tokens created by the launchpad.
pub const TOKEN_DECIMALS: u8 = 9;

/// Parse a strictly positive decimal string into base units.
pub fn parse_positive_amount(input: &str, decimals: u8) -> Result<u64, LaunchpadError> {
    let amount = parse_amount(input, decimals)?;
    if amount == 0 {
        return Err(LaunchpadError::InvalidAmount(format!(
            "{input:?} is not greater than zero"
        )));
    }
    Ok(amount)
}

/// Parse a non-negative decimal string into base units.
///
/// Accepts `"5"`, `"5."`, `".5"` and `"0.000000001"`. Rejects signs,
/// exponents, separators, and more fractional digits than `decimals`.
pub fn parse_amount(input: &str, decimals: u8) -> Result<u64, LaunchpadError> {
    let invalid = |why: &str| LaunchpadError::InvalidAmount(format!("{input:?}: {why}"));

    let s = input.trim();
    if s.is_empty() {
        return Err(invalid("empty"));
    }
    if s.starts_with('-') {
        return Err(invalid("negative"));
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid("no digits"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("not a number"));
    }
    if frac.len() > decimals as usize {
        return Err(invalid("too many decimal places"));
    }

    let scale = 10u64
        .checked_pow(decimals as u32)
        .ok_or_else(|| invalid("unsupported precision"))?;

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u64>()
            .map_err(|_| invalid("too large"))?
            .checked_mul(scale)
            .ok_or_else(|| invalid("too large"))?
    };

    let frac_units = if frac.is_empty() {
        0
    } else {
        let padded = format!("{frac:0<width$}", width = decimals as usize);
        padded.parse::<u64>().map_err(|_| invalid("not a number"))?
    };

    whole_units
        .checked_add(frac_units)
        .ok_or_else(|| invalid("too large"))
}

/// Format base units as a decimal string without trailing zeros.
pub fn format_amount(units: u64, decimals: u8) -> String {
    let scale = 10u64.pow(decimals as u32);
    let whole = units / scale;
    let frac = units % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0>width$}", width = decimals as usize);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}
