//! Engine configuration
//!
//! A JSON document naming the admin, the asset addresses, and the three
//! conversion rates as human-readable decimals, in rate-table order:
//!
//! ```json
//! {
//!   "admin": "0xdCe867155ec431Dba1Caa9c21f8567dBbe0472d4",
//!   "token": "0x3ADD0D140057303AeaA689C867Ca2eA3A7F844aD",
//!   "secondary_token": "0xF5387b28DF30aB2be8259E2e48824b6f7908938E",
//!   "stable_asset": "0x9999f7Fea5938fD3b1E26A12c3f2fb024e194f97",
//!   "native_marker": "0x0000000000000000000000000000000000001010",
//!   "rates": ["0.01", "0.01", "1"]
//! }
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use swap_types::ids::Address;
use swap_types::numeric::Rate;

use crate::errors::ConfigError;
use crate::events::AssetReference;
use crate::rates::SwapPair;

/// Deployment-time engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub admin: Address,
    pub token: Address,
    pub secondary_token: Address,
    pub stable_asset: Address,
    pub native_marker: Address,
    /// Rates as decimal strings: `TokenToNative`, `UsdcToToken`, `NativeToToken`
    pub rates: [Decimal; 3],
}

/// Parameters accepted by [`SwapEngine::init`](crate::engine::SwapEngine::init).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitParams {
    pub admin: Address,
    pub assets: AssetReference,
    pub rates: [Rate; 3],
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Scale the decimal rates to fixed point and bundle the addresses.
    ///
    /// Zero rates pass through here; the engine rejects them at `init`.
    pub fn to_init_params(&self) -> Result<InitParams, ConfigError> {
        let mut rates = [Rate::ZERO; 3];
        for pair in SwapPair::ALL {
            let value = self.rates[pair.index()];
            rates[pair.index()] = Rate::from_decimal(value)
                .map_err(|source| ConfigError::InvalidRate { pair, source })?;
        }
        Ok(InitParams {
            admin: self.admin,
            assets: AssetReference {
                token: self.token,
                secondary_token: self.secondary_token,
                stable_asset: self.stable_asset,
                native_marker: self.native_marker,
            },
            rates,
        })
    }
}
