//! Contract-specific error types
//!
//! Error taxonomy for the ledger, configuration, and swap engine layers.
//! Every `SwapError` aborts the whole call it was raised in.

use swap_types::errors::NumericError;
use swap_types::ids::Address;
use thiserror::Error;

use crate::rates::SwapPair;

/// Errors raised by the underlying asset ledger
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Insufficient balance of {asset} for {holder}: required {required}, available {available}")]
    InsufficientBalance {
        asset: Address,
        holder: Address,
        required: u128,
        available: u128,
    },

    #[error("Insufficient allowance of {asset} from {owner} to {spender}: required {required}, available {available}")]
    InsufficientAllowance {
        asset: Address,
        owner: Address,
        spender: Address,
        required: u128,
        available: u128,
    },

    #[error("Arithmetic overflow in ledger balance")]
    Overflow,
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid rate for {pair}: {source}")]
    InvalidRate {
        pair: SwapPair,
        #[source]
        source: NumericError,
    },
}

/// Swap engine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwapError {
    #[error("Engine not initialized")]
    NotInitialized,

    #[error("Engine already initialized")]
    AlreadyInitialized,

    #[error("Unauthorized: caller {caller} is not admin")]
    Unauthorized { caller: Address },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Invalid rate for {pair}: rate must be positive")]
    InvalidRate { pair: SwapPair },

    #[error("Insufficient funds of {asset}: required {required}, available {available}")]
    InsufficientFunds {
        asset: Address,
        required: u128,
        available: u128,
    },

    #[error("Transfer of {asset} failed: {reason}")]
    TransferFailed { asset: Address, reason: String },

    #[error("Reentrancy detected")]
    Reentrancy,

    #[error("Arithmetic overflow in conversion")]
    Overflow,
}

impl SwapError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        SwapError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn transfer_failed(asset: Address, err: LedgerError) -> Self {
        SwapError::TransferFailed {
            asset,
            reason: err.to_string(),
        }
    }
}

impl From<NumericError> for SwapError {
    fn from(err: NumericError) -> Self {
        match err {
            NumericError::Overflow => SwapError::Overflow,
            other => SwapError::invalid_input(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swap_types::ids::AddressExt;

    #[test]
    fn test_swap_error_display() {
        let err = SwapError::InsufficientFunds {
            asset: Address::from_low_u64(0x1010),
            required: 500,
            available: 20,
        };
        let msg = err.to_string();
        assert!(msg.contains("0x0000000000000000000000000000000000001010"));
        assert!(msg.contains("500"));
        assert!(msg.contains("20"));
    }

    #[test]
    fn test_invalid_rate_names_pair() {
        let err = SwapError::InvalidRate {
            pair: SwapPair::UsdcToToken,
        };
        assert!(err.to_string().contains("USDC/TOKEN"));
    }

    #[test]
    fn test_numeric_overflow_maps_to_overflow() {
        let err: SwapError = NumericError::Overflow.into();
        assert_eq!(err, SwapError::Overflow);
    }

    #[test]
    fn test_numeric_division_by_zero_maps_to_invalid_input() {
        let err: SwapError = NumericError::DivisionByZero.into();
        assert!(matches!(err, SwapError::InvalidInput { .. }));
    }

    #[test]
    fn test_ledger_error_display() {
        let err = LedgerError::InsufficientAllowance {
            asset: Address::from_low_u64(1),
            owner: Address::from_low_u64(2),
            spender: Address::from_low_u64(3),
            required: 10,
            available: 0,
        };
        assert!(err.to_string().contains("allowance"));
    }

    #[test]
    fn test_config_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ConfigError = json_err.into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
