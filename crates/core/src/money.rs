//! Fixed-point money handling.
//!
//! Balances and amounts are `rust_decimal::Decimal` with exactly two
//! fraction digits. Amounts arriving over the wire may be JSON numbers or
//! strings; both are parsed through their decimal string form, never through
//! binary floating point, so repeated operations stay drift-free. The only
//! float conversion happens at the serialization boundary via [`to_f64`].

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value as JsonValue;

use crate::error::DomainError;

/// Fraction digits carried by every balance and amount.
pub const MONEY_SCALE: u32 = 2;

/// Parse a positive monetary amount from its wire representation.
///
/// Accepts a JSON number or string. Rejects non-positive values and values
/// carrying more than two fraction digits; the result is normalized to
/// scale 2 (e.g. `5` parses as `5.00`).
pub fn parse_amount(raw: &JsonValue) -> Result<Decimal, DomainError> {
    let text = match raw {
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Null => return Err(DomainError::invalid_amount("amount is required")),
        _ => return Err(DomainError::invalid_amount("amount must be a number")),
    };

    let parsed = Decimal::from_str_exact(&text)
        .map_err(|_| DomainError::invalid_amount("amount is not a valid number"))?;

    if parsed <= Decimal::ZERO {
        return Err(DomainError::invalid_amount("amount must be positive"));
    }
    if parsed.scale() > MONEY_SCALE {
        return Err(DomainError::invalid_amount(
            "amount has more than two decimal places",
        ));
    }

    let mut amount = parsed;
    amount.rescale(MONEY_SCALE);
    Ok(amount)
}

/// Lossy float conversion used only when serializing balances and amounts
/// into JSON responses.
pub fn to_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}

/// A zero balance at money scale (`0.00`).
pub fn zero() -> Decimal {
    Decimal::new(0, MONEY_SCALE)
}
