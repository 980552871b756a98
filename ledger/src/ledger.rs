//! The credit ledger engine.

use std::sync::Arc;

use crate::error::LedgerError;
use crate::locks::LockRegistry;
use xskill_store::account::AccountStore;
use xskill_store::ledger::{LedgerEntryRecord, LedgerStore, NewLedgerEntry};
use xskill_types::{AccountId, Credits, EntryKind, SessionId, Timestamp};

/// Credit balances and the append-only entry log.
///
/// All mutations of one account are serialised through [`LockRegistry`];
/// multi-account transfers take both locks in ascending id order.
pub struct CreditLedger<S> {
    store: Arc<S>,
    locks: LockRegistry,
}

impl<S> CreditLedger<S>
where
    S: AccountStore + LedgerStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: LockRegistry::new(),
        }
    }

    /// Append a positive entry and raise the balance.
    pub fn credit(
        &self,
        account: AccountId,
        amount: Credits,
        kind: EntryKind,
        session_id: Option<SessionId>,
        description: Option<String>,
        now: Timestamp,
    ) -> Result<LedgerEntryRecord, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        let handle = self.locks.handle(account);
        let _guard = handle.lock().unwrap();
        self.apply_credit(account, amount, kind, session_id, description, now)
    }

    /// Append a negative entry and lower the balance. Fails without any
    /// side effect when the balance cannot cover the amount.
    pub fn debit(
        &self,
        account: AccountId,
        amount: Credits,
        kind: EntryKind,
        session_id: Option<SessionId>,
        description: Option<String>,
        now: Timestamp,
    ) -> Result<LedgerEntryRecord, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        let handle = self.locks.handle(account);
        let _guard = handle.lock().unwrap();
        self.apply_debit(account, amount, kind, session_id, description, now)
    }

    /// Move credits between two accounts: debit `from`, credit `to`. Both
    /// legs land or neither does; all validation happens before the first
    /// write, with both account locks held.
    #[allow(clippy::too_many_arguments)]
    pub fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Credits,
        session_id: Option<SessionId>,
        debit_kind: EntryKind,
        credit_kind: EntryKind,
        description: Option<String>,
        now: Timestamp,
    ) -> Result<(LedgerEntryRecord, LedgerEntryRecord), LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        if from == to {
            return Err(LedgerError::SelfTransfer);
        }

        let (first, second) = self.locks.ordered_pair(from, to);
        let _first_guard = first.lock().unwrap();
        let _second_guard = second.lock().unwrap();

        // Validate both sides before touching either.
        let from_balance = self.store.get_account(from)?.credit_balance;
        let to_balance = self.store.get_account(to)?.credit_balance;
        if from_balance < amount {
            return Err(LedgerError::InsufficientCredits {
                needed: amount.raw(),
                available: from_balance.raw(),
            });
        }
        to_balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        let debit_entry = self.apply_debit(
            from,
            amount,
            debit_kind,
            session_id,
            description.clone(),
            now,
        )?;
        let credit_entry =
            self.apply_credit(to, amount, credit_kind, session_id, description, now)?;

        tracing::debug!(
            from = %from,
            to = %to,
            amount = %amount,
            "transfer applied"
        );
        Ok((debit_entry, credit_entry))
    }

    /// Point-in-time balance read.
    pub fn balance(&self, account: AccountId) -> Result<Credits, LedgerError> {
        Ok(self.store.get_account(account)?.credit_balance)
    }

    /// Full entry history for an account, oldest first.
    pub fn entries(&self, account: AccountId) -> Result<Vec<LedgerEntryRecord>, LedgerError> {
        Ok(self.store.entries_for_account(account)?)
    }

    /// Whether the stored balance equals the sum of the account's entries.
    pub fn audit(&self, account: AccountId) -> Result<bool, LedgerError> {
        let balance = self.store.get_account(account)?.credit_balance;
        let sum: i64 = self
            .store
            .entries_for_account(account)?
            .iter()
            .map(|e| e.amount)
            .sum();
        Ok(sum >= 0 && balance.raw() == sum as u64)
    }

    // Callers must hold the account's lock.
    fn apply_credit(
        &self,
        account: AccountId,
        amount: Credits,
        kind: EntryKind,
        session_id: Option<SessionId>,
        description: Option<String>,
        now: Timestamp,
    ) -> Result<LedgerEntryRecord, LedgerError> {
        let balance = self.store.get_account(account)?.credit_balance;
        let updated = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        let entry = self.store.append_entry(NewLedgerEntry {
            account_id: account,
            session_id,
            amount: amount.as_signed(),
            kind,
            description,
            created_at: now,
        })?;
        self.store.set_balance(account, updated, now)?;
        Ok(entry)
    }

    // Callers must hold the account's lock.
    fn apply_debit(
        &self,
        account: AccountId,
        amount: Credits,
        kind: EntryKind,
        session_id: Option<SessionId>,
        description: Option<String>,
        now: Timestamp,
    ) -> Result<LedgerEntryRecord, LedgerError> {
        let balance = self.store.get_account(account)?.credit_balance;
        let updated = balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientCredits {
                needed: amount.raw(),
                available: balance.raw(),
            })?;
        let entry = self.store.append_entry(NewLedgerEntry {
            account_id: account,
            session_id,
            amount: amount.as_signed_debit(),
            kind,
            description,
            created_at: now,
        })?;
        self.store.set_balance(account, updated, now)?;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xskill_store_memory::MemoryStore;
    use xskill_types::Role;

    fn setup() -> (CreditLedger<MemoryStore>, AccountId, AccountId) {
        let store = Arc::new(MemoryStore::new());
        let a = store
            .insert_account(xskill_store::NewAccount {
                display_name: "a".into(),
                role: Role::Learner,
                created_at: Timestamp::new(100),
            })
            .unwrap()
            .id;
        let b = store
            .insert_account(xskill_store::NewAccount {
                display_name: "b".into(),
                role: Role::Teacher,
                created_at: Timestamp::new(100),
            })
            .unwrap()
            .id;
        (CreditLedger::new(store), a, b)
    }

    #[test]
    fn credit_then_debit_round_trip() {
        let (ledger, a, _) = setup();
        let now = Timestamp::new(200);
        ledger
            .credit(a, Credits::new(5), EntryKind::Bonus, None, None, now)
            .unwrap();
        assert_eq!(ledger.balance(a).unwrap(), Credits::new(5));
        ledger
            .debit(a, Credits::new(3), EntryKind::Spent, None, None, now)
            .unwrap();
        assert_eq!(ledger.balance(a).unwrap(), Credits::new(2));
        assert!(ledger.audit(a).unwrap());
    }

    #[test]
    fn debit_beyond_balance_fails_without_side_effect() {
        let (ledger, a, _) = setup();
        let now = Timestamp::new(200);
        ledger
            .credit(a, Credits::new(2), EntryKind::Bonus, None, None, now)
            .unwrap();
        let err = ledger
            .debit(a, Credits::new(3), EntryKind::Spent, None, None, now)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientCredits {
                needed: 3,
                available: 2
            }
        ));
        assert_eq!(ledger.balance(a).unwrap(), Credits::new(2));
        assert_eq!(ledger.entries(a).unwrap().len(), 1);
    }

    #[test]
    fn zero_amount_is_rejected() {
        let (ledger, a, _) = setup();
        let now = Timestamp::new(200);
        assert!(matches!(
            ledger.credit(a, Credits::ZERO, EntryKind::Bonus, None, None, now),
            Err(LedgerError::ZeroAmount)
        ));
        assert!(matches!(
            ledger.debit(a, Credits::ZERO, EntryKind::Spent, None, None, now),
            Err(LedgerError::ZeroAmount)
        ));
    }

    #[test]
    fn unknown_account_is_not_found() {
        let (ledger, _, _) = setup();
        let err = ledger
            .credit(
                AccountId::new(999),
                Credits::new(1),
                EntryKind::Bonus,
                None,
                None,
                Timestamp::new(200),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[test]
    fn failed_transfer_changes_neither_side() {
        let (ledger, a, b) = setup();
        let now = Timestamp::new(200);
        ledger
            .credit(a, Credits::new(1), EntryKind::Bonus, None, None, now)
            .unwrap();
        let err = ledger
            .transfer(
                a,
                b,
                Credits::new(5),
                Some(SessionId::new(1)),
                EntryKind::Spent,
                EntryKind::Earned,
                None,
                now,
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientCredits { .. }));
        assert_eq!(ledger.balance(a).unwrap(), Credits::new(1));
        assert_eq!(ledger.balance(b).unwrap(), Credits::ZERO);
        assert!(ledger.entries(b).unwrap().is_empty());
    }

    #[test]
    fn transfer_moves_credits_and_links_session() {
        let (ledger, a, b) = setup();
        let now = Timestamp::new(200);
        ledger
            .credit(a, Credits::new(4), EntryKind::Bonus, None, None, now)
            .unwrap();
        let (debit, credit) = ledger
            .transfer(
                a,
                b,
                Credits::new(3),
                Some(SessionId::new(7)),
                EntryKind::Spent,
                EntryKind::Earned,
                None,
                now,
            )
            .unwrap();
        assert_eq!(debit.amount, -3);
        assert_eq!(credit.amount, 3);
        assert_eq!(debit.session_id, Some(SessionId::new(7)));
        assert_eq!(ledger.balance(a).unwrap(), Credits::new(1));
        assert_eq!(ledger.balance(b).unwrap(), Credits::new(3));
        assert!(ledger.audit(a).unwrap());
        assert!(ledger.audit(b).unwrap());
    }

    #[test]
    fn self_transfer_is_rejected() {
        let (ledger, a, _) = setup();
        let err = ledger
            .transfer(
                a,
                a,
                Credits::new(1),
                Some(SessionId::new(1)),
                EntryKind::Spent,
                EntryKind::Earned,
                None,
                Timestamp::new(200),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::SelfTransfer));
    }

    #[test]
    fn concurrent_debits_never_go_negative() {
        use std::thread;

        let (ledger, a, _) = setup();
        let ledger = Arc::new(ledger);
        let now = Timestamp::new(200);
        ledger
            .credit(a, Credits::new(10), EntryKind::Bonus, None, None, now)
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let ledger = Arc::clone(&ledger);
            handles.push(thread::spawn(move || {
                ledger
                    .debit(a, Credits::new(1), EntryKind::Spent, None, None, now)
                    .is_ok()
            }));
        }
        let succeeded = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        // Exactly the funded number of debits land; the rest observe
        // InsufficientCredits, and the balance never dips below zero.
        assert_eq!(succeeded, 10);
        assert_eq!(ledger.balance(a).unwrap(), Credits::ZERO);
        assert!(ledger.audit(a).unwrap());
    }
}
