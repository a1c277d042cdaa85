//! Smart Contract Logic for the Fixed-Rate Swap Engine
//!
//! This crate implements the contract layer of a fixed-rate asset swap:
//! custody of the engine's funds, administrator-set conversion rates, a
//! single-admin access gate, and all-or-nothing execution of every call.
//!
//! # Modules
//! - `errors`: Contract-specific error types
//! - `events`: Contract events appended on every committed call
//! - `security`: Reentrancy guard and single-admin access control
//! - `rates`: Swap pairs and the three-entry rate table
//! - `ledger`: In-memory asset ledger (balances, allowances, receive hooks)
//! - `custody`: Per-call transaction scope over the engine's holdings
//! - `config`: JSON engine configuration
//! - `engine`: The swap engine entry points
//!
//! # Version
//! v0.1.0 — initial implementation

pub mod errors;
pub mod events;
pub mod security;
pub mod rates;
pub mod ledger;
pub mod custody;
pub mod config;
pub mod engine;

pub use config::{EngineConfig, InitParams};
pub use engine::{CallContext, SwapEngine};
pub use errors::SwapError;
pub use rates::SwapPair;

/// Contract ABI version — frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
