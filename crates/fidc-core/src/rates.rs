//! Rate conventions.
//!
//! Compounding conversions follow the 252 business-day convention:
//! - annual → daily: `(1 + r)^(1/252) - 1`
//! - monthly → daily: annualise with `(1 + r)^12 - 1`, then as above
//!
//! The fund waterfall itself accrues with simple interest, so the linear
//! helpers (`simple_*`) are what the engine uses; the compounded ones quote
//! the equivalent effective rates.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use tracing::warn;

use crate::types::{Rate, BUSINESS_DAYS_PER_YEAR, MONTHS_PER_YEAR};

/// Default business-day count for annual → daily conversion.
pub const DEFAULT_BUSINESS_DAYS: u32 = 252;

fn floor_at_zero(rate: Rate) -> Rate {
    rate.max(Decimal::ZERO)
}

/// `(1 + r)^exponent - 1`, saturating at `Decimal::MAX` when the power leaves
/// the decimal range. Past that magnitude `1 + r` and `r` are indistinguishable.
fn compound_effective(rate: Rate, exponent: Decimal) -> Rate {
    let base = Decimal::ONE.checked_add(rate).unwrap_or(rate);
    match base.checked_powd(exponent) {
        Some(factor) => factor - Decimal::ONE,
        None => {
            warn!(rate = %rate, exponent = %exponent, "compounded rate saturated at decimal range");
            Decimal::MAX
        }
    }
}

/// Compounded daily rate equivalent to an annual rate.
pub fn annual_to_daily(rate_aa: Rate, business_days: u32) -> Rate {
    let rate_aa = floor_at_zero(rate_aa);
    if rate_aa.is_zero() || business_days == 0 {
        return Decimal::ZERO;
    }
    compound_effective(rate_aa, Decimal::ONE / Decimal::from(business_days))
}

/// Compounded daily rate equivalent to a monthly rate: `(1 + r_m)^(12/252) - 1`.
/// Goes straight from the monthly rate so a monthly rate too large to
/// annualise still has a daily equivalent.
pub fn monthly_to_daily(rate_am: Rate) -> Rate {
    let rate_am = floor_at_zero(rate_am);
    if rate_am.is_zero() {
        return Decimal::ZERO;
    }
    compound_effective(rate_am, MONTHS_PER_YEAR / Decimal::from(DEFAULT_BUSINESS_DAYS))
}

/// `(1 + r_m)^12 - 1`, saturating at `Decimal::MAX`.
pub fn monthly_to_annual(rate_am: Rate) -> Rate {
    let rate_am = floor_at_zero(rate_am);
    if rate_am.is_zero() {
        return Decimal::ZERO;
    }
    compound_effective(rate_am, MONTHS_PER_YEAR)
}

/// `(1 + r_a)^(1/12) - 1`
pub fn annual_to_monthly(rate_aa: Rate) -> Rate {
    let rate_aa = floor_at_zero(rate_aa);
    if rate_aa.is_zero() {
        return Decimal::ZERO;
    }
    compound_effective(rate_aa, Decimal::ONE / MONTHS_PER_YEAR)
}

/// Compound a daily rate over `days` periods: `(1 + r_d)^days - 1`,
/// saturating at `Decimal::MAX`.
pub fn daily_to_annual(rate_d: Rate, days: u32) -> Rate {
    if rate_d <= dec!(-1) {
        return dec!(-1);
    }
    let base = Decimal::ONE.checked_add(rate_d).unwrap_or(rate_d);
    match base.checked_powi(days as i64) {
        Some(factor) => factor - Decimal::ONE,
        None => {
            warn!(rate = %rate_d, days, "compounded rate saturated at decimal range");
            Decimal::MAX
        }
    }
}

/// Simple-interest daily rate from an annual rate: `r / 252`.
pub fn simple_daily_from_annual(rate_aa: Rate) -> Rate {
    rate_aa / BUSINESS_DAYS_PER_YEAR
}

/// Simple-interest daily rate from a monthly rate: `r * 12 / 252`.
pub fn simple_daily_from_monthly(rate_am: Rate) -> Rate {
    rate_am * MONTHS_PER_YEAR / BUSINESS_DAYS_PER_YEAR
}

/// Inverse of [`simple_daily_from_monthly`].
pub fn simple_monthly_from_daily(rate_d: Rate) -> Rate {
    rate_d * BUSINESS_DAYS_PER_YEAR / MONTHS_PER_YEAR
}
