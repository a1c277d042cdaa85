//! Fixed-point rate type and conversion arithmetic
//!
//! Rates are unsigned fixed-point values scaled by 10^18 (`WAD`). Conversion
//! multiplies in 256 bits before dividing, so `amount * rate` never overflows
//! ahead of the division. Division truncates toward zero.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::NumericError;

/// Fixed-point scale: 10^18.
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Number of fractional digits carried by a [`Rate`].
pub const RATE_DECIMALS: u32 = 18;

/// Raw asset quantity in the asset's smallest unit.
pub type Amount = u128;

/// Conversion rate: output units per input unit, scaled by [`WAD`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(u128);

impl Rate {
    pub const ZERO: Rate = Rate(0);

    /// A rate of exactly 1.0.
    pub const ONE: Rate = Rate(WAD);

    /// Wrap an already-scaled value.
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Scale a human-readable decimal (e.g. `0.01`) to a WAD rate (`10^16`).
    ///
    /// Rejects negative values, values with more than 18 fractional digits,
    /// and values whose scaled form does not fit in `u128`. Zero converts to
    /// [`Rate::ZERO`]; rejecting zero is the rate table's job.
    pub fn from_decimal(value: Decimal) -> Result<Self, NumericError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(NumericError::NegativeRate {
                value: value.to_string(),
            });
        }
        let normalized = value.normalize();
        let scale = normalized.scale();
        if scale > RATE_DECIMALS {
            return Err(NumericError::ExcessPrecision {
                value: value.to_string(),
                max_decimals: RATE_DECIMALS,
            });
        }
        let factor = 10i128.pow(RATE_DECIMALS - scale);
        let scaled = normalized
            .mantissa()
            .checked_mul(factor)
            .ok_or(NumericError::Overflow)?;
        let raw = u128::try_from(scaled).map_err(|_| NumericError::Overflow)?;
        Ok(Self(raw))
    }

    /// Human-readable decimal form (`10^16` → `0.01`).
    pub fn to_decimal(&self) -> Result<Decimal, NumericError> {
        let signed = i128::try_from(self.0).map_err(|_| NumericError::Overflow)?;
        Decimal::try_from_i128_with_scale(signed, RATE_DECIMALS)
            .map(|d| d.normalize())
            .map_err(|_| NumericError::Overflow)
    }

    /// Apply the rate: `floor(amount * rate / 10^18)`.
    pub fn convert(&self, amount: Amount) -> Result<Amount, NumericError> {
        mul_div_floor(amount, self.0, WAD)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Ok(d) => write!(f, "{}", d),
            Err(_) => write!(f, "{}e-{}", self.0, RATE_DECIMALS),
        }
    }
}

/// `floor(a * b / denominator)` with a 256-bit intermediate product.
pub fn mul_div_floor(a: u128, b: u128, denominator: u128) -> Result<u128, NumericError> {
    if denominator == 0 {
        return Err(NumericError::DivisionByZero);
    }
    let product = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(NumericError::Overflow)?;
    let quotient = product / U256::from(denominator);
    u128::try_from(quotient).map_err(|_| NumericError::Overflow)
}
