//! Shared security primitives for the swap engine
//!
//! Provides the reentrancy guard and the single-admin access gate used by
//! every entry point of the engine.

use std::cell::Cell;
use swap_types::ids::Address;
use tracing::warn;

use crate::errors::SwapError;

/// Reentrancy guard preventing nested calls into protected functions.
///
/// An entry point enters the guard before touching state and holds the
/// returned [`Entered`] handle for the rest of the call. Any nested entry
/// attempt fails. Dropping the handle releases the guard, so it is released
/// on every exit path including early `?` returns.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    locked: Cell<bool>,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    pub fn new() -> Self {
        Self {
            locked: Cell::new(false),
        }
    }

    /// Acquire the guard for the duration of the returned handle.
    pub fn enter(&self) -> Result<Entered<'_>, SwapError> {
        if self.locked.replace(true) {
            warn!("reentrant call rejected");
            return Err(SwapError::Reentrancy);
        }
        Ok(Entered { guard: self })
    }

    /// Check if currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }
}

/// Proof that the current call holds the [`ReentrancyGuard`].
#[derive(Debug)]
pub struct Entered<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        self.guard.locked.set(false);
    }
}

/// Single-admin access control.
///
/// The admin is bound once when the engine is initialized and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControl {
    admin: Address,
}

impl AccessControl {
    /// Create access control with its admin.
    pub fn new(admin: Address) -> Self {
        Self { admin }
    }

    /// Check if a caller is admin.
    pub fn is_admin(&self, caller: &Address) -> bool {
        *caller == self.admin
    }

    /// Fail with `Unauthorized` unless `caller` is the admin.
    pub fn require_admin(&self, caller: &Address) -> Result<(), SwapError> {
        if !self.is_admin(caller) {
            warn!(%caller, admin = %self.admin, "privileged call rejected");
            return Err(SwapError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Get the admin identifier.
    pub fn admin(&self) -> Address {
        self.admin
    }
}
