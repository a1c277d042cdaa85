//! Contract events
//!
//! Events are immutable records appended once a call has committed. A failed
//! call emits nothing.

use serde::{Deserialize, Serialize};
use swap_types::ids::{Address, SwapId};
use swap_types::numeric::Rate;

use crate::rates::SwapPair;

/// Asset addresses bound at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReference {
    /// Primary project token
    pub token: Address,
    /// Secondary project token, accepted as an alternative swap output
    pub secondary_token: Address,
    /// Stable reference asset (USDC)
    pub stable_asset: Address,
    /// Marker address under which the native asset is tracked
    pub native_marker: Address,
}

/// Engine initialized and bound to its admin, assets, and rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initialized {
    pub admin: Address,
    pub assets: AssetReference,
    pub rates: [Rate; 3],
}

/// Conversion rates replaced by the admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatesUpdated {
    pub previous: [Rate; 3],
    pub current: [Rate; 3],
}

/// A swap completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swapped {
    pub swap_id: SwapId,
    pub pair: SwapPair,
    pub caller: Address,
    pub asset_in: Address,
    pub amount_in: u128,
    pub asset_out: Address,
    pub amount_out: u128,
    pub rate: Rate,
}

/// Native asset withdrawn to the admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeWithdrawn {
    pub admin: Address,
    pub amount: u128,
    /// Engine native balance after the withdrawal
    pub remaining: u128,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    Initialized(Initialized),
    RatesUpdated(RatesUpdated),
    Swapped(Swapped),
    NativeWithdrawn(NativeWithdrawn),
}
