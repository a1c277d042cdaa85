//! Rate table — one fixed conversion rate per supported swap pair
//!
//! The table always holds exactly three strictly positive rates, indexed in
//! the fixed order `TokenToNative`, `UsdcToToken`, `NativeToToken`.

use serde::{Deserialize, Serialize};
use std::fmt;
use swap_types::numeric::Rate;

use crate::errors::SwapError;

/// Supported swap pairs, in rate-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapPair {
    /// Project token in, native asset out
    TokenToNative,
    /// Stable asset in, project token out
    UsdcToToken,
    /// Native asset in, project token out
    NativeToToken,
}

impl SwapPair {
    /// All pairs in rate-table order.
    pub const ALL: [SwapPair; 3] = [
        SwapPair::TokenToNative,
        SwapPair::UsdcToToken,
        SwapPair::NativeToToken,
    ];

    /// Position of this pair in the rate table.
    pub const fn index(&self) -> usize {
        match self {
            SwapPair::TokenToNative => 0,
            SwapPair::UsdcToToken => 1,
            SwapPair::NativeToToken => 2,
        }
    }
}

impl fmt::Display for SwapPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SwapPair::TokenToNative => "TOKEN/NATIVE",
            SwapPair::UsdcToToken => "USDC/TOKEN",
            SwapPair::NativeToToken => "NATIVE/TOKEN",
        };
        f.write_str(label)
    }
}

/// The three active conversion rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateTable {
    rates: [Rate; 3],
}

impl RateTable {
    /// Build a table, rejecting any zero rate.
    pub fn new(rates: [Rate; 3]) -> Result<Self, SwapError> {
        Self::validate(&rates)?;
        Ok(Self { rates })
    }

    /// Rate for one pair.
    pub fn get(&self, pair: SwapPair) -> Rate {
        self.rates[pair.index()]
    }

    /// Replace all three rates, or none if any is zero.
    ///
    /// Returns the previous rates.
    pub fn replace(&mut self, rates: [Rate; 3]) -> Result<[Rate; 3], SwapError> {
        Self::validate(&rates)?;
        Ok(std::mem::replace(&mut self.rates, rates))
    }

    pub fn as_array(&self) -> [Rate; 3] {
        self.rates
    }

    fn validate(rates: &[Rate; 3]) -> Result<(), SwapError> {
        match SwapPair::ALL.iter().find(|pair| rates[pair.index()].is_zero()) {
            Some(pair) => Err(SwapError::InvalidRate { pair: *pair }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates(a: u128, b: u128, c: u128) -> [Rate; 3] {
        [Rate::from_raw(a), Rate::from_raw(b), Rate::from_raw(c)]
    }

    #[test]
    fn test_get_by_pair() {
        let table = RateTable::new(rates(1, 2, 3)).unwrap();
        assert_eq!(table.get(SwapPair::TokenToNative), Rate::from_raw(1));
        assert_eq!(table.get(SwapPair::UsdcToToken), Rate::from_raw(2));
        assert_eq!(table.get(SwapPair::NativeToToken), Rate::from_raw(3));
    }

    #[test]
    fn test_new_rejects_zero() {
        let result = RateTable::new(rates(1, 0, 3));
        assert_eq!(
            result,
            Err(SwapError::InvalidRate {
                pair: SwapPair::UsdcToToken
            })
        );
    }

    #[test]
    fn test_replace_returns_previous() {
        let mut table = RateTable::new(rates(1, 2, 3)).unwrap();
        let previous = table.replace(rates(4, 5, 6)).unwrap();
        assert_eq!(previous, rates(1, 2, 3));
        assert_eq!(table.as_array(), rates(4, 5, 6));
    }

    #[test]
    fn test_replace_is_all_or_nothing() {
        let mut table = RateTable::new(rates(1, 2, 3)).unwrap();
        let result = table.replace(rates(7, 8, 0));
        assert_eq!(
            result,
            Err(SwapError::InvalidRate {
                pair: SwapPair::NativeToToken
            })
        );
        assert_eq!(table.as_array(), rates(1, 2, 3));
    }

    #[test]
    fn test_pair_order_matches_index() {
        for (i, pair) in SwapPair::ALL.iter().enumerate() {
            assert_eq!(pair.index(), i);
        }
    }
}
