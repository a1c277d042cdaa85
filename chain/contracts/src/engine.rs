//! Swap engine — fixed-rate conversion between the native asset, the stable
//! asset, and the project tokens
//!
//! Every state-changing entry point runs as one all-or-nothing call:
//! 1. Reentrancy guard
//! 2. Lifecycle check
//! 3. Access control (privileged calls)
//! 4. Input validation
//! 5. Custody pull, conversion, custody push
//! 6. Commit and event
//!
//! A failure at any step drops the custody scope uncommitted, which reverts
//! every balance and allowance write made during the call.
//!
//! The engine also fronts the asset system for everyone else: accounts move,
//! approve and register hooks for their own holdings only, and the engine's
//! own account is never reachable from outside a custody scope.

use std::cell::RefCell;
use std::rc::Rc;
use swap_types::ids::{Address, SwapId};
use swap_types::numeric::Rate;
use tracing::{debug, info, warn};

use crate::config::InitParams;
use crate::custody::Custody;
use crate::errors::SwapError;
use crate::events::{
    AssetReference, ContractEvent, Initialized, NativeWithdrawn, RatesUpdated, Swapped,
};
use crate::ledger::{AssetLedger, ReceiveHook};
use crate::rates::{RateTable, SwapPair};
use crate::security::{AccessControl, ReentrancyGuard};

/// Who is calling, and how much native value the call carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    pub value: u128,
}

impl CallContext {
    /// A call carrying no native value.
    pub fn new(caller: Address) -> Self {
        Self { caller, value: 0 }
    }

    /// A call carrying `value` of the native asset.
    pub fn with_value(caller: Address, value: u128) -> Self {
        Self { caller, value }
    }
}

#[derive(Debug)]
struct ActiveState {
    access: AccessControl,
    assets: AssetReference,
    rates: RateTable,
}

#[derive(Debug)]
enum Lifecycle {
    Uninitialized,
    Active(ActiveState),
}

/// The swap engine contract.
///
/// Entry points take `&self`; state lives behind `RefCell`s so a recipient
/// hook holding a reference to the engine can attempt a nested call and be
/// turned away by the reentrancy guard. The engine is single-threaded; the
/// environment that hosts it orders concurrent callers.
#[derive(Debug)]
pub struct SwapEngine {
    /// The engine's own account in the ledger
    address: Address,
    ledger: RefCell<AssetLedger>,
    lifecycle: RefCell<Lifecycle>,
    guard: ReentrancyGuard,
    /// Emitted events log (append-only)
    events: RefCell<Vec<ContractEvent>>,
}

impl SwapEngine {
    /// Create an uninitialized engine at `address` over an empty ledger.
    pub fn new(address: Address) -> Self {
        Self::with_ledger(address, AssetLedger::new())
    }

    /// Create an uninitialized engine at `address` over an existing ledger.
    pub fn with_ledger(address: Address, ledger: AssetLedger) -> Self {
        Self {
            address,
            ledger: RefCell::new(ledger),
            lifecycle: RefCell::new(Lifecycle::Uninitialized),
            guard: ReentrancyGuard::new(),
            events: RefCell::new(Vec::new()),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    // ───────────────────────── Lifecycle ─────────────────────────

    /// Bind admin, assets, and rates. Callable by anyone, exactly once.
    pub fn init(&self, ctx: CallContext, params: InitParams) -> Result<ContractEvent, SwapError> {
        let _entered = self.guard.enter()?;
        reject_value(&ctx)?;

        let mut lifecycle = self.lifecycle.borrow_mut();
        if matches!(*lifecycle, Lifecycle::Active(_)) {
            return Err(SwapError::AlreadyInitialized);
        }
        let rates = RateTable::new(params.rates)?;
        *lifecycle = Lifecycle::Active(ActiveState {
            access: AccessControl::new(params.admin),
            assets: params.assets,
            rates,
        });
        drop(lifecycle);

        info!(
            engine = %self.address,
            admin = %params.admin,
            token_to_native = %params.rates[0],
            usdc_to_token = %params.rates[1],
            native_to_token = %params.rates[2],
            "swap engine initialized"
        );
        Ok(self.emit(ContractEvent::Initialized(Initialized {
            admin: params.admin,
            assets: params.assets,
            rates: params.rates,
        })))
    }

    pub fn is_initialized(&self) -> bool {
        matches!(*self.lifecycle.borrow(), Lifecycle::Active(_))
    }

    // ───────────────────────── Swaps ─────────────────────────

    /// Token in, native asset out at the `TokenToNative` rate.
    ///
    /// `native_asset_id` must be the native marker bound at init. The caller
    /// must have approved the engine for `amount` Token.
    pub fn swap_tokens(
        &self,
        ctx: CallContext,
        amount: u128,
        native_asset_id: Address,
    ) -> Result<ContractEvent, SwapError> {
        let _entered = self.guard.enter()?;
        let assets = self.assets()?;
        reject_value(&ctx)?;
        if native_asset_id != assets.native_marker {
            return Err(SwapError::invalid_input(format!(
                "{} is not the native asset",
                native_asset_id
            )));
        }
        self.execute_swap(ctx, SwapPair::TokenToNative, amount, &assets, assets.native_marker)
    }

    /// Stable asset in, Token (or SecondaryToken) out at the `UsdcToToken` rate.
    pub fn swap_usdc_to_token(
        &self,
        ctx: CallContext,
        amount: u128,
        token_id: Address,
    ) -> Result<ContractEvent, SwapError> {
        let _entered = self.guard.enter()?;
        let assets = self.assets()?;
        reject_value(&ctx)?;
        let asset_out = resolve_token(&assets, token_id)?;
        self.execute_swap(ctx, SwapPair::UsdcToToken, amount, &assets, asset_out)
    }

    /// Attached native value in, Token (or SecondaryToken) out at the
    /// `NativeToToken` rate. `ctx.value` must equal `amount`.
    pub fn swap_native_to_token(
        &self,
        ctx: CallContext,
        amount: u128,
        token_id: Address,
    ) -> Result<ContractEvent, SwapError> {
        let _entered = self.guard.enter()?;
        let assets = self.assets()?;
        if ctx.value != amount {
            return Err(SwapError::invalid_input(format!(
                "attached value {} does not match amount {}",
                ctx.value, amount
            )));
        }
        let asset_out = resolve_token(&assets, token_id)?;
        self.execute_swap(ctx, SwapPair::NativeToToken, amount, &assets, asset_out)
    }

    /// Shared swap body; the caller already holds the guard and validated
    /// the pair-specific inputs.
    fn execute_swap(
        &self,
        ctx: CallContext,
        pair: SwapPair,
        amount: u128,
        assets: &AssetReference,
        asset_out: Address,
    ) -> Result<ContractEvent, SwapError> {
        if amount == 0 {
            return Err(SwapError::invalid_input("amount must be positive"));
        }

        let asset_in = input_asset(assets, pair);
        let mut custody = Custody::begin(&self.ledger, self.address, assets.native_marker);
        match pair {
            // Attached value is the input; there is no allowance to pull against.
            SwapPair::NativeToToken => custody.receive_attached(ctx.caller, amount)?,
            _ => custody.pull(asset_in, ctx.caller, amount)?,
        }

        let rate = self.conversion_rate(pair)?;
        let amount_out = convert(rate, amount)?;

        custody.push(asset_out, ctx.caller, amount_out)?;
        custody.commit();

        info!(
            %pair,
            caller = %ctx.caller,
            amount_in = amount,
            amount_out,
            %rate,
            "swap executed"
        );
        Ok(self.emit(ContractEvent::Swapped(Swapped {
            swap_id: SwapId::new(),
            pair,
            caller: ctx.caller,
            asset_in,
            amount_in: amount,
            asset_out,
            amount_out,
            rate,
        })))
    }

    // ───────────────────────── Admin ─────────────────────────

    /// Send `amount` of the engine's native balance to the admin. Admin-only.
    pub fn withdraw_native(&self, ctx: CallContext, amount: u128) -> Result<ContractEvent, SwapError> {
        let _entered = self.guard.enter()?;
        let (admin, native) = self.with_active(|state| {
            state
                .access
                .require_admin(&ctx.caller)
                .map(|()| (state.access.admin(), state.assets.native_marker))
        })??;
        reject_value(&ctx)?;
        if amount == 0 {
            return Err(SwapError::invalid_input("withdrawal amount must be positive"));
        }

        let mut custody = Custody::begin(&self.ledger, self.address, native);
        custody.withdraw(admin, amount)?;
        let remaining = custody.balance(&native);
        custody.commit();

        info!(%admin, amount, remaining, "native asset withdrawn");
        Ok(self.emit(ContractEvent::NativeWithdrawn(NativeWithdrawn {
            admin,
            amount,
            remaining,
        })))
    }

    /// Replace all three conversion rates. Admin-only; all rates must be
    /// positive.
    pub fn set_conversion_rates(
        &self,
        ctx: CallContext,
        rates: [Rate; 3],
    ) -> Result<ContractEvent, SwapError> {
        let _entered = self.guard.enter()?;
        reject_value(&ctx)?;
        let mut lifecycle = self.lifecycle.borrow_mut();
        let Lifecycle::Active(state) = &mut *lifecycle else {
            return Err(SwapError::NotInitialized);
        };
        state.access.require_admin(&ctx.caller)?;
        let previous = state.rates.replace(rates)?;
        drop(lifecycle);

        info!(
            token_to_native = %rates[0],
            usdc_to_token = %rates[1],
            native_to_token = %rates[2],
            "conversion rates updated"
        );
        Ok(self.emit(ContractEvent::RatesUpdated(RatesUpdated {
            previous,
            current: rates,
        })))
    }

    // ───────────────────────── Views ─────────────────────────

    pub fn conversion_rate(&self, pair: SwapPair) -> Result<Rate, SwapError> {
        self.with_active(|state| state.rates.get(pair))
    }

    pub fn conversion_rates(&self) -> Result<[Rate; 3], SwapError> {
        self.with_active(|state| state.rates.as_array())
    }

    pub fn admin(&self) -> Result<Address, SwapError> {
        self.with_active(|state| state.access.admin())
    }

    pub fn assets(&self) -> Result<AssetReference, SwapError> {
        self.with_active(|state| state.assets)
    }

    /// The engine's holding of `asset`.
    pub fn custody_balance(&self, asset: &Address) -> u128 {
        self.ledger.borrow().balance_of(asset, &self.address)
    }

    /// Output a swap of `amount` on `pair` would pay at the current rate.
    pub fn quote(&self, pair: SwapPair, amount: u128) -> Result<u128, SwapError> {
        let rate = self.conversion_rate(pair)?;
        if amount == 0 {
            return Err(SwapError::invalid_input("amount must be positive"));
        }
        convert(rate, amount)
    }

    // ───────────────────────── Asset system ─────────────────────────

    pub fn balance_of(&self, asset: &Address, holder: &Address) -> u128 {
        self.ledger.borrow().balance_of(asset, holder)
    }

    pub fn allowance(&self, asset: &Address, owner: &Address, spender: &Address) -> u128 {
        self.ledger.borrow().allowance(asset, owner, spender)
    }

    /// Issue `amount` of `asset` to `to`. Issuance takes from no one.
    pub fn mint(&self, asset: Address, to: Address, amount: u128) -> Result<(), SwapError> {
        self.ledger
            .borrow_mut()
            .mint(asset, to, amount)
            .map_err(|e| SwapError::transfer_failed(asset, e))
    }

    /// Let `spender` pull up to `amount` of the caller's `asset`.
    pub fn approve(
        &self,
        ctx: CallContext,
        asset: Address,
        spender: Address,
        amount: u128,
    ) -> Result<(), SwapError> {
        self.require_external(&ctx)?;
        self.ledger
            .borrow_mut()
            .approve(asset, ctx.caller, spender, amount);
        debug!(%asset, owner = %ctx.caller, %spender, amount, "allowance set");
        Ok(())
    }

    /// Move `amount` of the caller's own `asset` to `to`.
    pub fn transfer(
        &self,
        ctx: CallContext,
        asset: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), SwapError> {
        self.require_external(&ctx)?;
        self.ledger
            .borrow_mut()
            .transfer(asset, ctx.caller, to, amount)
            .map_err(|e| SwapError::transfer_failed(asset, e))?;
        debug!(%asset, from = %ctx.caller, %to, amount, "asset transferred");
        Ok(())
    }

    /// Run `hook` whenever the engine pays the caller.
    pub fn set_receive_hook(
        &self,
        ctx: CallContext,
        hook: Rc<dyn ReceiveHook>,
    ) -> Result<(), SwapError> {
        self.require_external(&ctx)?;
        self.ledger.borrow_mut().set_receive_hook(ctx.caller, hook);
        Ok(())
    }

    pub fn clear_receive_hook(&self, ctx: CallContext) {
        self.ledger.borrow_mut().clear_receive_hook(&ctx.caller);
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> Vec<ContractEvent> {
        self.events.borrow().clone()
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&self) -> Vec<ContractEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    // ───────────────────────── Internal ─────────────────────────

    fn with_active<R>(&self, f: impl FnOnce(&ActiveState) -> R) -> Result<R, SwapError> {
        match &*self.lifecycle.borrow() {
            Lifecycle::Active(state) => Ok(f(state)),
            Lifecycle::Uninitialized => Err(SwapError::NotInitialized),
        }
    }

    /// The engine's account moves only through custody.
    fn require_external(&self, ctx: &CallContext) -> Result<(), SwapError> {
        if ctx.caller == self.address {
            warn!(engine = %self.address, "asset operation on the engine's own account refused");
            return Err(SwapError::Unauthorized { caller: ctx.caller });
        }
        Ok(())
    }

    fn emit(&self, event: ContractEvent) -> ContractEvent {
        self.events.borrow_mut().push(event.clone());
        event
    }
}

/// `floor(amount * rate / 10^18)`, refusing a swap that would pay nothing.
fn convert(rate: Rate, amount: u128) -> Result<u128, SwapError> {
    let amount_out = rate.convert(amount)?;
    if amount_out == 0 {
        return Err(SwapError::invalid_input(format!(
            "amount {} converts to zero at rate {}",
            amount, rate
        )));
    }
    Ok(amount_out)
}

fn input_asset(assets: &AssetReference, pair: SwapPair) -> Address {
    match pair {
        SwapPair::TokenToNative => assets.token,
        SwapPair::UsdcToToken => assets.stable_asset,
        SwapPair::NativeToToken => assets.native_marker,
    }
}

fn reject_value(ctx: &CallContext) -> Result<(), SwapError> {
    if ctx.value != 0 {
        return Err(SwapError::invalid_input(format!(
            "call does not accept native value, got {}",
            ctx.value
        )));
    }
    Ok(())
}

/// Accept either project token as a swap output.
fn resolve_token(assets: &AssetReference, token_id: Address) -> Result<Address, SwapError> {
    if token_id == assets.token || token_id == assets.secondary_token {
        Ok(token_id)
    } else {
        Err(SwapError::invalid_input(format!(
            "{} is not a supported output token",
            token_id
        )))
    }
}
