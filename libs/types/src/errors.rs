//! Error types for the shared swap types
//!
//! Comprehensive error taxonomy using thiserror

use thiserror::Error;

/// Fixed-point arithmetic errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumericError {
    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Rate must not be negative: {value}")]
    NegativeRate { value: String },

    #[error("Rate {value} has more than {max_decimals} decimal places")]
    ExcessPrecision { value: String, max_decimals: u32 },
}
