//! Identifier types for swap engine entities
//!
//! Accounts and assets share one 20-byte address space, the way the chain the
//! engine is deployed on addresses both externally owned accounts and token
//! contracts. Swaps carry UUID v7 identifiers so indexers can order them.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 20-byte account or asset address.
///
/// Parses from hex with or without `0x`, displays EIP-55 checksummed and
/// serializes as the same string.
pub use alloy_primitives::Address;

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Constructors the engine needs on top of [`Address`].
pub trait AddressExt {
    /// Build an address whose trailing bytes hold `value` (big-endian).
    ///
    /// Handy for well-known low addresses such as precompiles and the
    /// native-asset marker `0x…1010`.
    fn from_low_u64(value: u64) -> Self;
}

impl AddressExt for Address {
    fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[ADDRESS_LEN - 8..].copy_from_slice(&value.to_be_bytes());
        Address::new(bytes)
    }
}

/// Unique identifier for a completed swap
///
/// Uses UUID v7 for time-based sorting of the swap history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwapId(Uuid);

impl SwapId {
    /// Create a new SwapId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SwapId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SwapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
