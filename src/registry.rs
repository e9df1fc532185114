// 🏦 Account Registry
//
// Owns every Account (keyed by account id) and the system-wide transaction
// log. It is the only place accounts are created or destroyed: on explicit
// closure, or by the deletion sweep once an account has been marked after
// repeated failed logins.
//
// One registry instance is passed explicitly to whoever drives it; there is
// no global state, so tests can run many registries side by side.

use crate::entities::account::{
    Account, AccountKind, AccountType, DEFAULT_CHECKING_FEE, DEFAULT_SAVINGS_RATE,
};
use crate::credential::Credential;
use crate::error::{LedgerError, Result};
use crate::ids::IdGenerator;
use crate::ledger::{Transaction, TransactionKind, TransactionLog};
use crate::strength;
use std::collections::BTreeMap;

/// Fee and rate given to newly opened accounts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountDefaults {
    pub checking_fee: f64,
    pub savings_rate: f64,
}

impl Default for AccountDefaults {
    fn default() -> Self {
        AccountDefaults {
            checking_fee: DEFAULT_CHECKING_FEE,
            savings_rate: DEFAULT_SAVINGS_RATE,
        }
    }
}

pub struct AccountRegistry {
    accounts: BTreeMap<String, Account>,
    ledger: TransactionLog,
    ids: IdGenerator,
    defaults: AccountDefaults,
}

impl AccountRegistry {
    /// Create new empty registry with an entropy-seeded id generator
    pub fn new() -> Self {
        Self::with_generator(IdGenerator::new())
    }

    pub fn with_generator(ids: IdGenerator) -> Self {
        AccountRegistry {
            accounts: BTreeMap::new(),
            ledger: TransactionLog::new(),
            ids,
            defaults: AccountDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: AccountDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Rebuild a registry from persisted records.
    ///
    /// A repeated account id keeps the last record seen. Loaded transaction
    /// ids are reserved so new ones never collide with them.
    pub fn from_records(
        accounts: Vec<Account>,
        transactions: Vec<Transaction>,
        mut ids: IdGenerator,
    ) -> Self {
        ids.reserve_transaction_ids(transactions.iter().map(|tx| tx.id.as_str()));

        let mut map = BTreeMap::new();
        for account in accounts {
            let id = account.id().to_string();
            if map.insert(id.clone(), account).is_some() {
                tracing::warn!("Duplicate account record for {}, keeping the last one", id);
            }
        }

        AccountRegistry {
            accounts: map,
            ledger: TransactionLog::from_transactions(transactions),
            ids,
            defaults: AccountDefaults::default(),
        }
    }

    // ========================================================================
    // LOOKUPS
    // ========================================================================

    pub fn find(&self, account_id: &str) -> Option<&Account> {
        self.accounts.get(account_id)
    }

    pub fn contains(&self, account_id: &str) -> bool {
        self.accounts.contains_key(account_id)
    }

    /// All accounts, ordered by id
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn ledger(&self) -> &TransactionLog {
        &self.ledger
    }

    pub fn defaults(&self) -> AccountDefaults {
        self.defaults
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn total_balance(&self) -> f64 {
        self.accounts.values().map(Account::balance).sum()
    }

    // ========================================================================
    // ACCOUNT LIFECYCLE
    // ========================================================================

    /// Open a new account and return its id.
    ///
    /// Weak passwords only produce a warning. Owner names may not contain
    /// commas or line breaks since they would corrupt the flat-file record.
    pub fn create_account(
        &mut self,
        owner: &str,
        account_type: AccountType,
        initial_balance: f64,
        password: &str,
    ) -> Result<String> {
        let owner = owner.trim();
        if owner.is_empty() {
            return Err(LedgerError::invalid_input("owner name cannot be empty"));
        }
        if owner.contains([',', '\n', '\r']) {
            return Err(LedgerError::invalid_input(
                "owner name cannot contain commas or line breaks",
            ));
        }
        if !initial_balance.is_finite() || initial_balance < 0.0 {
            return Err(LedgerError::invalid_input(format!(
                "initial balance cannot be negative (got {})",
                initial_balance
            )));
        }
        if password.is_empty() {
            return Err(LedgerError::invalid_input("password cannot be empty"));
        }
        if IdGenerator::account_space_exhausted(self.accounts.len()) {
            return Err(LedgerError::invalid_input("no free account ids remain"));
        }

        let score = strength::score(password);
        if score < strength::WEAK_THRESHOLD {
            tracing::warn!(
                "Password is weak (strength: {}/10); consider mixing cases, digits and symbols",
                score
            );
        }

        let accounts = &self.accounts;
        let id = self.ids.next_account_id(|candidate| accounts.contains_key(candidate));

        let kind = match account_type {
            AccountType::Checking => AccountKind::Checking {
                fee: self.defaults.checking_fee,
            },
            AccountType::Savings => AccountKind::Savings {
                rate: self.defaults.savings_rate,
            },
        };

        let account = Account::new(
            id.clone(),
            owner.to_string(),
            kind,
            initial_balance,
            Credential::new(password),
        );
        self.accounts.insert(id.clone(), account);

        tracing::info!("Account {} created for {}", id, owner);
        Ok(id)
    }

    /// Close an account after checking its password; returns the removed account
    pub fn close_account(&mut self, account_id: &str, password: &str) -> Result<Account> {
        require_credentials(account_id, password)?;

        let account = self
            .accounts
            .get_mut(account_id)
            .ok_or_else(|| LedgerError::not_found(account_id))?;

        if account.should_be_deleted() {
            self.cleanup_deleted_accounts();
            return Err(LedgerError::AccountDeleted {
                account_id: account_id.to_string(),
            });
        }

        if let Err(e) = account.validate_password(password) {
            return Err(self.after_failed_login(account_id, e));
        }

        let closed = self
            .accounts
            .remove(account_id)
            .ok_or_else(|| LedgerError::not_found(account_id))?;
        tracing::info!("Account {} closed", account_id);
        Ok(closed)
    }

    /// Authenticate against an account; always sweeps afterwards
    pub fn validate_account(&mut self, account_id: &str, password: &str) -> Result<()> {
        require_credentials(account_id, password)?;

        let account = self
            .accounts
            .get_mut(account_id)
            .ok_or_else(|| LedgerError::not_found(account_id))?;

        if account.should_be_deleted() {
            return Err(LedgerError::MarkedForDeletion {
                account_id: account_id.to_string(),
            });
        }

        match account.validate_password(password) {
            Ok(()) => {
                self.cleanup_deleted_accounts();
                Ok(())
            }
            Err(e) => Err(self.after_failed_login(account_id, e)),
        }
    }

    /// Remove every account marked for deletion; returns the removed ids.
    ///
    /// Ids are collected first and removed afterwards so the map is never
    /// mutated while it is being walked.
    pub fn cleanup_deleted_accounts(&mut self) -> Vec<String> {
        let doomed: Vec<String> = self
            .accounts
            .values()
            .filter(|account| account.should_be_deleted())
            .map(|account| account.id().to_string())
            .collect();

        for account_id in &doomed {
            if self.accounts.remove(account_id).is_some() {
                tracing::warn!(
                    "SECURITY ALERT: Account {} has been DELETED due to multiple failed login attempts",
                    account_id
                );
            }
        }

        doomed
    }

    /// Sweep after a rejected login; a swept account is reported as deleted
    fn after_failed_login(&mut self, account_id: &str, error: LedgerError) -> LedgerError {
        let deleted = self.cleanup_deleted_accounts();
        if deleted.iter().any(|id| id == account_id) {
            LedgerError::AccountDeleted {
                account_id: account_id.to_string(),
            }
        } else {
            error
        }
    }

    // ========================================================================
    // MONEY MOVEMENT
    // ========================================================================

    /// Deposit into an account; returns the new balance
    pub fn deposit(&mut self, account_id: &str, amount: f64) -> Result<f64> {
        let account = self
            .accounts
            .get_mut(account_id)
            .ok_or_else(|| LedgerError::not_found(account_id))?;

        account.deposit(amount, &mut self.ids)?;
        let balance = account.balance();
        self.append_to_ledger(account_id, TransactionKind::Deposit, amount);
        Ok(balance)
    }

    /// Withdraw from an account; returns the new balance.
    ///
    /// The ledger entry carries the requested amount; a checking fee is
    /// debited but not recorded as its own line.
    pub fn withdraw(&mut self, account_id: &str, amount: f64) -> Result<f64> {
        let account = self
            .accounts
            .get_mut(account_id)
            .ok_or_else(|| LedgerError::not_found(account_id))?;

        account.withdraw(amount, &mut self.ids)?;
        let balance = account.balance();
        self.append_to_ledger(account_id, TransactionKind::Withdrawal, amount);
        Ok(balance)
    }

    /// Pay interest into every savings account.
    ///
    /// Interest goes through the account's own deposit path only, so it lands
    /// in the recent history but not in the system-wide ledger.
    pub fn apply_interest_to_all(&mut self) -> Vec<Transaction> {
        let mut paid = Vec::new();
        for account in self.accounts.values_mut() {
            match account.apply_interest(&mut self.ids) {
                Ok(Some(transaction)) => {
                    tracing::debug!(
                        "Interest of {:.2} paid into {}",
                        transaction.amount,
                        account.id()
                    );
                    paid.push(transaction);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Interest skipped for {}: {}", account.id(), e),
            }
        }
        tracing::info!("Interest applied to {} savings account(s)", paid.len());
        paid
    }

    fn append_to_ledger(&mut self, account_id: &str, kind: TransactionKind, amount: f64) {
        let transaction = Transaction::new(self.ids.next_transaction_id(), account_id, kind, amount);
        tracing::debug!(
            "Ledger {} {} {:.2} on {}",
            transaction.id,
            kind,
            amount,
            account_id
        );
        self.ledger.append(transaction);
    }
}

impl Default for AccountRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn require_credentials(account_id: &str, password: &str) -> Result<()> {
    if account_id.trim().is_empty() || password.is_empty() {
        return Err(LedgerError::invalid_input(
            "account id and password are required",
        ));
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::account::SecurityState;
    use crate::error::ErrorKind;
    use std::collections::HashSet;

    const PASSWORD: &str = "Str0ng!Passw0rd";

    fn create_test_registry() -> AccountRegistry {
        AccountRegistry::with_generator(IdGenerator::seeded(2024))
    }

    fn open(registry: &mut AccountRegistry, kind: AccountType, balance: f64) -> String {
        registry
            .create_account("Ada Lovelace", kind, balance, PASSWORD)
            .unwrap()
    }

    #[test]
    fn test_create_account() {
        let mut registry = create_test_registry();
        let id = open(&mut registry, AccountType::Checking, 100.0);

        let account = registry.find(&id).unwrap();
        assert!(id.starts_with("ACC"));
        assert_eq!(account.owner(), "Ada Lovelace");
        assert_eq!(account.kind(), &AccountKind::Checking { fee: 1.0 });
        assert_eq!(account.balance(), 100.0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_create_account_rejects_bad_input() {
        let mut registry = create_test_registry();
        let cases = [
            ("Ada", -1.0, PASSWORD),
            ("", 10.0, PASSWORD),
            ("Ada, Countess", 10.0, PASSWORD),
            ("Ada", 10.0, ""),
            ("Ada", f64::NAN, PASSWORD),
        ];
        for (owner, balance, password) in cases {
            let err = registry
                .create_account(owner, AccountType::Savings, balance, password)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_weak_password_still_creates_account() {
        let mut registry = create_test_registry();
        assert!(registry
            .create_account("Bob", AccountType::Savings, 0.0, "abc")
            .is_ok());
    }

    #[test]
    fn test_create_account_ids_unique() {
        let mut registry = create_test_registry();
        let ids: HashSet<String> = (0..500)
            .map(|_| open(&mut registry, AccountType::Savings, 1.0))
            .collect();
        assert_eq!(ids.len(), 500);
        assert_eq!(registry.len(), 500);
    }

    #[test]
    fn test_create_account_skips_existing_id() {
        // learn the first id this seed would produce, then occupy it
        let mut probe = IdGenerator::seeded(77);
        let first = probe.next_account_id(|_| false);

        let existing = Account::new(
            first.clone(),
            "Existing".to_string(),
            AccountKind::Checking { fee: 1.0 },
            5.0,
            Credential::new(PASSWORD),
        );
        let mut registry =
            AccountRegistry::from_records(vec![existing], Vec::new(), IdGenerator::seeded(77));

        let id = open(&mut registry, AccountType::Checking, 1.0);
        assert_ne!(id, first);
        assert_eq!(registry.find(&first).unwrap().owner(), "Existing");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_defaults_apply_to_new_accounts() {
        let mut registry = create_test_registry().with_defaults(AccountDefaults {
            checking_fee: 2.5,
            savings_rate: 0.05,
        });
        let checking = open(&mut registry, AccountType::Checking, 10.0);
        let savings = open(&mut registry, AccountType::Savings, 10.0);
        assert_eq!(registry.find(&checking).unwrap().kind().extra(), Some(2.5));
        assert_eq!(registry.find(&savings).unwrap().kind().extra(), Some(0.05));
    }

    #[test]
    fn test_validate_account() {
        let mut registry = create_test_registry();
        let id = open(&mut registry, AccountType::Checking, 10.0);

        assert!(registry.validate_account(&id, PASSWORD).is_ok());
        assert_eq!(
            registry.validate_account("ACC00000", PASSWORD).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            registry.validate_account(&id, "").unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_five_failures_delete_account() {
        let mut registry = create_test_registry();
        let id = open(&mut registry, AccountType::Checking, 10.0);
        let other = open(&mut registry, AccountType::Savings, 10.0);

        for _ in 0..4 {
            let err = registry.validate_account(&id, "nope").unwrap_err();
            assert_ne!(err.kind(), ErrorKind::AccountDeleted);
        }
        assert_eq!(
            registry.find(&id).unwrap().security_state(),
            SecurityState::LockedFinal
        );

        let err = registry.validate_account(&id, "nope").unwrap_err();
        assert!(matches!(err, LedgerError::AccountDeleted { ref account_id } if *account_id == id));
        assert!(!registry.contains(&id));
        assert!(registry.contains(&other));

        // gone for good
        assert_eq!(
            registry.validate_account(&id, PASSWORD).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_close_account() {
        let mut registry = create_test_registry();
        let id = open(&mut registry, AccountType::Savings, 42.0);

        let err = registry.close_account(&id, "wrong").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
        assert!(registry.contains(&id));

        let closed = registry.close_account(&id, PASSWORD).unwrap();
        assert_eq!(closed.balance(), 42.0);
        assert!(!registry.contains(&id));
        assert_eq!(
            registry.close_account(&id, PASSWORD).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_close_account_failures_count_toward_deletion() {
        let mut registry = create_test_registry();
        let id = open(&mut registry, AccountType::Checking, 10.0);

        for _ in 0..4 {
            assert!(registry.close_account(&id, "wrong").is_err());
        }
        let err = registry.close_account(&id, "wrong").unwrap_err();
        assert!(matches!(err, LedgerError::AccountDeleted { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_marked_account_fails_fast_and_close_sweeps() {
        let mut registry = create_test_registry();
        let id = open(&mut registry, AccountType::Checking, 10.0);
        for _ in 0..5 {
            registry
                .accounts
                .get_mut(&id)
                .unwrap()
                .record_failed_attempt();
        }

        // login is refused without consuming another attempt
        let err = registry.validate_account(&id, PASSWORD).unwrap_err();
        assert!(matches!(err, LedgerError::MarkedForDeletion { ref account_id } if *account_id == id));
        assert!(registry.contains(&id));
        assert_eq!(registry.find(&id).unwrap().failed_attempts(), 5);

        let err = registry.close_account(&id, PASSWORD).unwrap_err();
        assert!(matches!(err, LedgerError::AccountDeleted { ref account_id } if *account_id == id));
        assert!(!registry.contains(&id));
    }

    #[test]
    fn test_sweep_removes_only_marked_accounts() {
        let mut registry = create_test_registry();
        let doomed = open(&mut registry, AccountType::Checking, 10.0);
        let safe = open(&mut registry, AccountType::Checking, 10.0);

        for _ in 0..5 {
            registry
                .accounts
                .get_mut(&doomed)
                .unwrap()
                .record_failed_attempt();
        }

        let removed = registry.cleanup_deleted_accounts();
        assert_eq!(removed, vec![doomed.clone()]);
        assert!(registry.contains(&safe));
        assert!(registry.cleanup_deleted_accounts().is_empty());
    }

    #[test]
    fn test_deposit_and_withdraw_update_ledger() {
        let mut registry = create_test_registry();
        let id = open(&mut registry, AccountType::Savings, 20.0);

        assert_eq!(registry.deposit(&id, 5.0).unwrap(), 25.0);
        assert_eq!(registry.withdraw(&id, 10.0).unwrap(), 15.0);

        let entries = registry.ledger().all();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, TransactionKind::Deposit);
        assert_eq!(entries[1].kind, TransactionKind::Withdrawal);
        assert_ne!(entries[0].id, entries[1].id);
    }

    #[test]
    fn test_rejected_operations_leave_no_trace() {
        let mut registry = create_test_registry();
        let id = open(&mut registry, AccountType::Savings, 20.0);

        for amount in [0.0, -3.0] {
            assert!(registry.deposit(&id, amount).is_err());
            assert!(registry.withdraw(&id, amount).is_err());
        }
        assert!(registry.withdraw(&id, 20.01).is_err());
        assert!(registry.deposit("ACC00000", 5.0).is_err());

        assert_eq!(registry.find(&id).unwrap().balance(), 20.0);
        assert!(registry.ledger().is_empty());
    }

    #[test]
    fn test_checking_scenario() {
        let mut registry = create_test_registry();
        let id = open(&mut registry, AccountType::Checking, 100.0);

        assert_eq!(registry.deposit(&id, 50.0).unwrap(), 150.0);
        assert_eq!(registry.ledger().len(), 1);
        assert_eq!(registry.ledger().all()[0].amount, 50.0);

        // 149.5 + 1.0 fee exceeds 150; 149 + 1.0 would drain it exactly
        assert!(registry.withdraw(&id, 149.5).is_err());
        assert_eq!(registry.find(&id).unwrap().balance(), 150.0);

        assert_eq!(registry.withdraw(&id, 100.0).unwrap(), 49.0);
        let last = registry.ledger().all().last().unwrap();
        assert_eq!(last.kind, TransactionKind::Withdrawal);
        assert_eq!(last.amount, 100.0);
        assert_eq!(registry.ledger().len(), 2);
    }

    #[test]
    fn test_withdraw_fee_exactly_drains_balance() {
        let mut registry = create_test_registry();
        let id = open(&mut registry, AccountType::Checking, 100.0);
        registry.deposit(&id, 50.0).unwrap();

        assert_eq!(registry.withdraw(&id, 149.0).unwrap(), 0.0);
        assert_eq!(registry.ledger().all().last().unwrap().amount, 149.0);
        assert!(registry.withdraw(&id, 0.01).is_err());
    }

    #[test]
    fn test_apply_interest_to_all() {
        let mut registry = create_test_registry();
        let savings = open(&mut registry, AccountType::Savings, 1000.0);
        let checking = open(&mut registry, AccountType::Checking, 1000.0);

        let paid = registry.apply_interest_to_all();
        assert_eq!(paid.len(), 1);
        assert!((registry.find(&savings).unwrap().balance() - 1020.0).abs() < 1e-9);
        assert_eq!(registry.find(&checking).unwrap().balance(), 1000.0);

        // recent history only, not the system-wide ledger
        assert_eq!(registry.find(&savings).unwrap().recent_transactions().len(), 1);
        assert!(registry.ledger().is_empty());
    }

    #[test]
    fn test_total_balance() {
        let mut registry = create_test_registry();
        open(&mut registry, AccountType::Savings, 1000.0);
        open(&mut registry, AccountType::Checking, 500.0);
        assert_eq!(registry.total_balance(), 1500.0);
    }
}
