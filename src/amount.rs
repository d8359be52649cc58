//! Display ⇄ atomic unit conversion.
//!
//! One display unit (XFG) is 100_000_000 atomic units. The daemons only ever
//! see atomic integers; the UI only ever sees display floats.
//!
//! CHANGELOG:
//! - 10/13/2026 - Floor on the decimal value instead of the binary product
//! - 10/12/2026 - Initial implementation

use thiserror::Error;

/// Atomic units per display unit.
pub const ATOMIC_UNITS: u64 = 100_000_000;

/// Number of decimal places carried by an atomic unit.
const DECIMALS: usize = 8;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmountError {
    #[error("Amount must be a finite number, got {0}")]
    NotFinite(f64),

    #[error("Amount must not be negative, got {0}")]
    Negative(f64),

    #[error("Amount {0} is too large")]
    Overflow(f64),
}

/// Convert a display amount to atomic units: `floor(amount * 1e8)`.
///
/// The floor is taken on the decimal value the float stands for, not on the
/// binary product. `1.23456789 * 1e8` is `123456788.99999999` in IEEE doubles,
/// but the user typed 1.23456789 and expects 123456789 units.
pub fn to_atomic(amount: f64) -> Result<u64, AmountError> {
    if !amount.is_finite() {
        return Err(AmountError::NotFinite(amount));
    }
    if amount < 0.0 {
        return Err(AmountError::Negative(amount));
    }
    // -0.0 prints as "-0"
    let amount = amount.abs();

    // Display for f64 prints the shortest representation that round-trips,
    // never in exponent form.
    let text = amount.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let whole: u64 = whole.parse().map_err(|_| AmountError::Overflow(amount))?;
    let mut digits: String = fraction.chars().take(DECIMALS).collect();
    while digits.len() < DECIMALS {
        digits.push('0');
    }
    let fraction: u64 = digits.parse().map_err(|_| AmountError::Overflow(amount))?;

    whole
        .checked_mul(ATOMIC_UNITS)
        .and_then(|w| w.checked_add(fraction))
        .ok_or(AmountError::Overflow(amount))
}

/// Convert atomic units reported by a daemon to a display amount.
pub fn from_atomic(atomic: i64) -> f64 {
    atomic as f64 / ATOMIC_UNITS as f64
}

/// Read an atomic amount out of a JSON field, treating anything missing or
/// non-numeric as zero.
pub fn atomic_field(value: &serde_json::Value, field: &str) -> i64 {
    value
        .get(field)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(0)
}
