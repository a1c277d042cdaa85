//! Asset ledger — balances, allowances and receive hooks
//!
//! Stands in for the chain's asset system: the native asset and every token
//! are tracked here by `(asset, holder)`. Pulls spend an allowance the owner
//! granted to the spender, the way token contracts implement
//! approve-then-transfer-from. A holder may register a [`ReceiveHook`] that
//! runs whenever the engine pays it, which is how a recipient contract gets
//! control mid-call.
//!
//! The engine's custody balance is simply its own entry in this ledger.
//! While a custody scope is open every balance and allowance write is
//! journaled with the value it replaced, so a failed call is undone in
//! reverse order without copying the ledger.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use swap_types::ids::Address;

use crate::errors::{LedgerError, SwapError};

/// Callback run after a holder is paid by the engine.
///
/// Returning an error aborts the paying call.
pub trait ReceiveHook {
    fn on_receive(&self, asset: Address, from: Address, amount: u128) -> Result<(), SwapError>;
}

/// Value an entry held before a write inside an open journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JournalEntry {
    Balance {
        asset: Address,
        holder: Address,
        previous: u128,
    },
    Allowance {
        asset: Address,
        owner: Address,
        spender: Address,
        previous: u128,
    },
}

/// Position in the journal a scope can later commit or revert to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub(crate) struct JournalMark(usize);

/// In-memory multi-asset ledger.
#[derive(Default)]
pub struct AssetLedger {
    /// (asset, holder) -> balance
    balances: HashMap<(Address, Address), u128>,
    /// (asset, owner, spender) -> remaining allowance
    allowances: HashMap<(Address, Address, Address), u128>,
    hooks: HashMap<Address, Rc<dyn ReceiveHook>>,
    /// Undo log, recorded only while at least one scope is open
    journal: Vec<JournalEntry>,
    open_scopes: usize,
}

impl AssetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn balance_of(&self, asset: &Address, holder: &Address) -> u128 {
        self.balances.get(&(*asset, *holder)).copied().unwrap_or(0)
    }

    pub fn allowance(&self, asset: &Address, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(*asset, *owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    // ───────────────────────── Mutations ─────────────────────────

    /// Create `amount` of `asset` out of thin air for `to`.
    ///
    /// Used to fund accounts and the engine itself; the asset system's own
    /// issuance is outside the engine.
    pub fn mint(&mut self, asset: Address, to: Address, amount: u128) -> Result<(), LedgerError> {
        let balance = self
            .balance_of(&asset, &to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.write_balance(asset, to, balance);
        Ok(())
    }

    /// Set the allowance `spender` may pull from `owner`.
    ///
    /// The owner is the account authorizing the approval.
    pub fn approve(&mut self, asset: Address, owner: Address, spender: Address, amount: u128) {
        self.write_allowance(asset, owner, spender, amount);
    }

    /// Move `amount` of `asset` from `from` to `to`, authorized by `from`.
    ///
    /// Either both balances change or neither does.
    pub(crate) fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let from_balance = self.balance_of(&asset, &from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                asset,
                holder: from,
                required: amount,
                available: from_balance,
            });
        }
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance_of(&asset, &to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.write_balance(asset, from, from_balance - amount);
        self.write_balance(asset, to, to_balance);
        Ok(())
    }

    /// Move `amount` of `asset` from `from` to `to` on behalf of `spender`,
    /// consuming `spender`'s allowance.
    pub(crate) fn transfer_from(
        &mut self,
        asset: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let allowed = self.allowance(&asset, &from, &spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                asset,
                owner: from,
                spender,
                required: amount,
                available: allowed,
            });
        }
        self.transfer(asset, from, to, amount)?;
        self.write_allowance(asset, from, spender, allowed - amount);
        Ok(())
    }

    // ───────────────────────── Hooks ─────────────────────────

    pub fn set_receive_hook(&mut self, holder: Address, hook: Rc<dyn ReceiveHook>) {
        self.hooks.insert(holder, hook);
    }

    pub fn clear_receive_hook(&mut self, holder: &Address) {
        self.hooks.remove(holder);
    }

    pub fn receive_hook(&self, holder: &Address) -> Option<Rc<dyn ReceiveHook>> {
        self.hooks.get(holder).cloned()
    }

    // ───────────────────────── Journal ─────────────────────────

    /// Start recording balance and allowance writes. Hooks are not journaled.
    pub(crate) fn open_journal(&mut self) -> JournalMark {
        self.open_scopes += 1;
        JournalMark(self.journal.len())
    }

    /// Keep every write since `mark`. Entries stay recorded while an outer
    /// scope is still open so it can revert them.
    pub(crate) fn commit_journal(&mut self, mark: JournalMark) {
        debug_assert!(self.open_scopes > 0, "commit without an open journal");
        debug_assert!(mark.0 <= self.journal.len(), "journal mark past the end");
        self.open_scopes -= 1;
        if self.open_scopes == 0 {
            self.journal.clear();
        }
    }

    /// Undo every write since `mark`, newest first. Returns how many entries
    /// were reverted.
    pub(crate) fn revert_journal(&mut self, mark: JournalMark) -> usize {
        debug_assert!(self.open_scopes > 0, "revert without an open journal");
        let undone = self.journal.split_off(mark.0.min(self.journal.len()));
        let reverted = undone.len();
        for entry in undone.into_iter().rev() {
            match entry {
                JournalEntry::Balance {
                    asset,
                    holder,
                    previous,
                } => store(&mut self.balances, (asset, holder), previous),
                JournalEntry::Allowance {
                    asset,
                    owner,
                    spender,
                    previous,
                } => store(&mut self.allowances, (asset, owner, spender), previous),
            }
        }
        self.open_scopes = self.open_scopes.saturating_sub(1);
        if self.open_scopes == 0 {
            self.journal.clear();
        }
        reverted
    }

    /// Number of writes recorded since the outermost scope opened.
    pub(crate) fn journal_len(&self) -> usize {
        self.journal.len()
    }

    fn write_balance(&mut self, asset: Address, holder: Address, value: u128) {
        if self.open_scopes > 0 {
            let previous = self.balance_of(&asset, &holder);
            self.journal.push(JournalEntry::Balance {
                asset,
                holder,
                previous,
            });
        }
        store(&mut self.balances, (asset, holder), value);
    }

    fn write_allowance(&mut self, asset: Address, owner: Address, spender: Address, value: u128) {
        if self.open_scopes > 0 {
            let previous = self.allowance(&asset, &owner, &spender);
            self.journal.push(JournalEntry::Allowance {
                asset,
                owner,
                spender,
                previous,
            });
        }
        store(&mut self.allowances, (asset, owner, spender), value);
    }
}

/// Zero entries are removed so the maps only hold live positions.
fn store<K: std::hash::Hash + Eq>(map: &mut HashMap<K, u128>, key: K, value: u128) {
    if value == 0 {
        map.remove(&key);
    } else {
        map.insert(key, value);
    }
}

impl fmt::Debug for AssetLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetLedger")
            .field("balances", &self.balances)
            .field("allowances", &self.allowances)
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .field("journal", &self.journal.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use swap_types::ids::AddressExt;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    const TOKEN: u64 = 0xaa;

    #[test]
    fn test_mint_and_balance() {
        let mut ledger = AssetLedger::new();
        ledger.mint(addr(TOKEN), addr(1), 100).unwrap();
        ledger.mint(addr(TOKEN), addr(1), 50).unwrap();
        assert_eq!(ledger.balance_of(&addr(TOKEN), &addr(1)), 150);
        assert_eq!(ledger.balance_of(&addr(TOKEN), &addr(2)), 0);
    }

    #[test]
    fn test_mint_overflow() {
        let mut ledger = AssetLedger::new();
        ledger.mint(addr(TOKEN), addr(1), u128::MAX).unwrap();
        assert_eq!(
            ledger.mint(addr(TOKEN), addr(1), 1),
            Err(LedgerError::Overflow)
        );
        assert_eq!(ledger.balance_of(&addr(TOKEN), &addr(1)), u128::MAX);
    }

    #[test]
    fn test_transfer_moves_balance() {
        let mut ledger = AssetLedger::new();
        ledger.mint(addr(TOKEN), addr(1), 100).unwrap();
        ledger.transfer(addr(TOKEN), addr(1), addr(2), 30).unwrap();
        assert_eq!(ledger.balance_of(&addr(TOKEN), &addr(1)), 70);
        assert_eq!(ledger.balance_of(&addr(TOKEN), &addr(2)), 30);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut ledger = AssetLedger::new();
        ledger.mint(addr(TOKEN), addr(1), 10).unwrap();
        let result = ledger.transfer(addr(TOKEN), addr(1), addr(2), 11);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance { available: 10, .. })
        ));
        assert_eq!(ledger.balance_of(&addr(TOKEN), &addr(1)), 10);
    }

    #[test]
    fn test_transfer_to_self_is_noop() {
        let mut ledger = AssetLedger::new();
        ledger.mint(addr(TOKEN), addr(1), 10).unwrap();
        ledger.transfer(addr(TOKEN), addr(1), addr(1), 10).unwrap();
        assert_eq!(ledger.balance_of(&addr(TOKEN), &addr(1)), 10);
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut ledger = AssetLedger::new();
        ledger.mint(addr(TOKEN), addr(1), 100).unwrap();
        ledger.approve(addr(TOKEN), addr(1), addr(9), 60);
        ledger
            .transfer_from(addr(TOKEN), addr(9), addr(1), addr(9), 40)
            .unwrap();
        assert_eq!(ledger.allowance(&addr(TOKEN), &addr(1), &addr(9)), 20);
        assert_eq!(ledger.balance_of(&addr(TOKEN), &addr(9)), 40);
    }

    #[test]
    fn test_transfer_from_without_allowance() {
        let mut ledger = AssetLedger::new();
        ledger.mint(addr(TOKEN), addr(1), 100).unwrap();
        let result = ledger.transfer_from(addr(TOKEN), addr(9), addr(1), addr(9), 1);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientAllowance { .. })
        ));
    }

    #[test]
    fn test_transfer_from_keeps_allowance_on_balance_failure() {
        let mut ledger = AssetLedger::new();
        ledger.mint(addr(TOKEN), addr(1), 5).unwrap();
        ledger.approve(addr(TOKEN), addr(1), addr(9), 60);
        let result = ledger.transfer_from(addr(TOKEN), addr(9), addr(1), addr(9), 10);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(ledger.allowance(&addr(TOKEN), &addr(1), &addr(9)), 60);
    }

    #[test]
    fn test_journal_revert_restores_touched_entries() {
        let mut ledger = AssetLedger::new();
        ledger.mint(addr(TOKEN), addr(1), 100).unwrap();
        ledger.approve(addr(TOKEN), addr(1), addr(9), 50);

        let mark = ledger.open_journal();
        ledger
            .transfer_from(addr(TOKEN), addr(9), addr(1), addr(9), 50)
            .unwrap();
        // Debit, credit, allowance spend
        assert_eq!(ledger.journal_len(), 3);
        assert_eq!(ledger.revert_journal(mark), 3);

        assert_eq!(ledger.balance_of(&addr(TOKEN), &addr(1)), 100);
        assert_eq!(ledger.balance_of(&addr(TOKEN), &addr(9)), 0);
        assert_eq!(ledger.allowance(&addr(TOKEN), &addr(1), &addr(9)), 50);
        assert_eq!(ledger.journal_len(), 0);
    }

    #[test]
    fn test_journal_records_nothing_when_closed() {
        let mut ledger = AssetLedger::new();
        ledger.mint(addr(TOKEN), addr(1), 100).unwrap();
        ledger.transfer(addr(TOKEN), addr(1), addr(2), 10).unwrap();
        assert_eq!(ledger.journal_len(), 0);
    }

    #[test]
    fn test_journal_commit_keeps_writes() {
        let mut ledger = AssetLedger::new();
        let mark = ledger.open_journal();
        ledger.mint(addr(TOKEN), addr(1), 100).unwrap();
        ledger.commit_journal(mark);
        assert_eq!(ledger.journal_len(), 0);
        assert_eq!(ledger.balance_of(&addr(TOKEN), &addr(1)), 100);
    }

    #[test]
    fn test_outer_revert_covers_committed_inner_scope() {
        let mut ledger = AssetLedger::new();
        ledger.mint(addr(TOKEN), addr(1), 100).unwrap();

        let outer = ledger.open_journal();
        ledger.transfer(addr(TOKEN), addr(1), addr(2), 10).unwrap();
        let inner = ledger.open_journal();
        ledger.transfer(addr(TOKEN), addr(1), addr(3), 20).unwrap();
        ledger.commit_journal(inner);
        assert_eq!(ledger.journal_len(), 4);

        ledger.revert_journal(outer);
        assert_eq!(ledger.balance_of(&addr(TOKEN), &addr(1)), 100);
        assert_eq!(ledger.balance_of(&addr(TOKEN), &addr(2)), 0);
        assert_eq!(ledger.balance_of(&addr(TOKEN), &addr(3)), 0);
    }

    #[test]
    fn test_revert_leaves_unjournaled_entries_alone() {
        let mut ledger = AssetLedger::new();
        ledger.mint(addr(TOKEN), addr(1), 100).unwrap();
        ledger.mint(addr(TOKEN), addr(5), 7).unwrap();

        let mark = ledger.open_journal();
        ledger.transfer(addr(TOKEN), addr(1), addr(2), 40).unwrap();
        ledger.revert_journal(mark);

        // Entries written after the scope closed are untouched by it
        ledger.approve(addr(TOKEN), addr(5), addr(9), 3);
        assert_eq!(ledger.balance_of(&addr(TOKEN), &addr(5)), 7);
        assert_eq!(ledger.allowance(&addr(TOKEN), &addr(5), &addr(9)), 3);
        assert_eq!(ledger.balance_of(&addr(TOKEN), &addr(1)), 100);
    }

    struct Counter(Cell<u32>);

    impl ReceiveHook for Counter {
        fn on_receive(&self, _asset: Address, _from: Address, _amount: u128) -> Result<(), SwapError> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_receive_hook_registry() {
        let mut ledger = AssetLedger::new();
        let counter = Rc::new(Counter(Cell::new(0)));
        ledger.set_receive_hook(addr(2), counter.clone());

        let hook = ledger.receive_hook(&addr(2)).unwrap();
        hook.on_receive(addr(TOKEN), addr(1), 1).unwrap();
        assert_eq!(counter.0.get(), 1);

        ledger.clear_receive_hook(&addr(2));
        assert!(ledger.receive_hook(&addr(2)).is_none());
    }
}
