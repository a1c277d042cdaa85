//! Types library for the fixed-rate swap engine
//!
//! Shared type definitions used by the contract layer and by anything that
//! configures or observes it.
//!
//! # Modules
//! - `ids`: Addresses and swap identifiers
//! - `numeric`: Fixed-point rates and 256-bit conversion arithmetic
//! - `errors`: Error taxonomy

pub mod ids;
pub mod numeric;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::errors::*;
}
