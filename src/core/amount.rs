//! Gross/net arithmetic.
//!
//! Results keep full `Decimal` precision. Rounding to cents is left to the
//! caller.

use rust_decimal::Decimal;

use super::types::CalculationResult;

/// Breakdown for a net amount: tax is added on top.
///
/// # Panics
///
/// If the result exceeds the `Decimal` range (about 7.9e28). Use
/// [`checked_from_net`] for untrusted amounts.
pub fn from_net(net: Decimal, rate: Decimal) -> CalculationResult {
    let tax_value = net * rate;
    CalculationResult {
        price: net + tax_value,
        net_price: net,
        tax_rate: rate,
        tax_value,
    }
}

/// Breakdown for a gross amount: tax is extracted from it.
///
/// `rate` must be greater than -1; rates from the rate table are in `[0, 1)`.
///
/// # Panics
///
/// If `rate` is -1 or the result exceeds the `Decimal` range. Use
/// [`checked_from_gross`] for untrusted input.
pub fn from_gross(gross: Decimal, rate: Decimal) -> CalculationResult {
    let net_price = gross / (Decimal::ONE + rate);
    CalculationResult {
        price: gross,
        net_price,
        tax_rate: rate,
        tax_value: gross - net_price,
    }
}

/// Like [`from_net`], `None` on overflow.
pub fn checked_from_net(net: Decimal, rate: Decimal) -> Option<CalculationResult> {
    let tax_value = net.checked_mul(rate)?;
    Some(CalculationResult {
        price: net.checked_add(tax_value)?,
        net_price: net,
        tax_rate: rate,
        tax_value,
    })
}

/// Like [`from_gross`], `None` on overflow or a rate of -1.
pub fn checked_from_gross(gross: Decimal, rate: Decimal) -> Option<CalculationResult> {
    let net_price = gross.checked_div(Decimal::ONE.checked_add(rate)?)?;
    Some(CalculationResult {
        price: gross,
        net_price,
        tax_rate: rate,
        tax_value: gross.checked_sub(net_price)?,
    })
}
