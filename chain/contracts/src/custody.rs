//! Custody — the engine's own holdings, moved one call at a time
//!
//! A [`Custody`] scope is opened at the start of every state-changing call.
//! It opens a ledger journal, performs the call's pulls and pushes, and on
//! drop reverts every journaled write in reverse order unless
//! [`Custody::commit`] was reached. A call that fails anywhere after its
//! first transfer therefore leaves no balance or allowance change behind,
//! including changes a recipient hook made through the asset system while
//! the call was running.

use std::cell::RefCell;
use swap_types::ids::Address;
use tracing::debug;

use crate::errors::SwapError;
use crate::ledger::{AssetLedger, JournalMark};

/// Per-call transaction scope over the engine's ledger entries.
pub struct Custody<'a> {
    ledger: &'a RefCell<AssetLedger>,
    engine: Address,
    native: Address,
    /// Present until committed; reverted to on drop.
    mark: Option<JournalMark>,
}

impl<'a> Custody<'a> {
    /// Open a scope for `engine`, whose native holdings live under `native`.
    pub fn begin(ledger: &'a RefCell<AssetLedger>, engine: Address, native: Address) -> Self {
        let mark = ledger.borrow_mut().open_journal();
        Self {
            ledger,
            engine,
            native,
            mark: Some(mark),
        }
    }

    /// The engine's current holding of `asset`.
    pub fn balance(&self, asset: &Address) -> u128 {
        self.ledger.borrow().balance_of(asset, &self.engine)
    }

    /// Take the native value attached to the call.
    pub fn receive_attached(&mut self, from: Address, amount: u128) -> Result<(), SwapError> {
        let native = self.native;
        self.ledger
            .borrow_mut()
            .transfer(native, from, self.engine, amount)
            .map_err(|e| SwapError::transfer_failed(native, e))?;
        debug!(asset = %native, %from, amount, "attached value received");
        Ok(())
    }

    /// Pull `amount` of `asset` from `from` using its allowance for the engine.
    pub fn pull(&mut self, asset: Address, from: Address, amount: u128) -> Result<(), SwapError> {
        self.ledger
            .borrow_mut()
            .transfer_from(asset, self.engine, from, self.engine, amount)
            .map_err(|e| SwapError::transfer_failed(asset, e))?;
        debug!(%asset, %from, amount, "pulled into custody");
        Ok(())
    }

    /// Pay `amount` of `asset` out of custody to `to`, then run `to`'s
    /// receive hook.
    pub fn push(&mut self, asset: Address, to: Address, amount: u128) -> Result<(), SwapError> {
        let hook = {
            let mut ledger = self.ledger.borrow_mut();
            let available = ledger.balance_of(&asset, &self.engine);
            if available < amount {
                return Err(SwapError::InsufficientFunds {
                    asset,
                    required: amount,
                    available,
                });
            }
            ledger
                .transfer(asset, self.engine, to, amount)
                .map_err(|e| SwapError::transfer_failed(asset, e))?;
            ledger.receive_hook(&to)
        };
        debug!(%asset, %to, amount, "pushed from custody");

        // Ledger borrow is released so the hook may use the asset system.
        if let Some(hook) = hook {
            hook.on_receive(asset, self.engine, amount)?;
        }
        Ok(())
    }

    /// Send native asset held by the engine to `admin`.
    pub fn withdraw(&mut self, admin: Address, amount: u128) -> Result<(), SwapError> {
        self.push(self.native, admin, amount)
    }

    /// Keep every transfer made in this scope.
    pub fn commit(mut self) {
        if let Some(mark) = self.mark.take() {
            self.ledger.borrow_mut().commit_journal(mark);
        }
    }
}

impl Drop for Custody<'_> {
    /// Ledger borrows never outlive a custody method, so the ledger is free
    /// here; a held borrow panics rather than keeping a partial call.
    fn drop(&mut self) {
        let Some(mark) = self.mark.take() else {
            return;
        };
        let reverted = self.ledger.borrow_mut().revert_journal(mark);
        debug!(engine = %self.engine, reverted, "custody rolled back");
    }
}
