// 💳 Account Entity - balance, credentials and the lockout state machine
//
// Identity: account id (ACC#####), stable for the account's lifetime
// Values: owner, kind, balance, credential, recent history
// Security: consecutive failed logins drive
//   Unlocked (0-2) → LockedWarning (3) → LockedFinal (4) → MarkedForDeletion (5+)
//
// A locked account keeps consuming attempts on every further try, even with
// the right password. Only the registry removes accounts.

use crate::credential::Credential;
use crate::error::{LedgerError, Result};
use crate::ids::IdGenerator;
use crate::ledger::{RecentTransactions, Transaction, TransactionKind};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// SECURITY POLICY
// ============================================================================

pub const LOCK_THRESHOLD: u32 = 3;
pub const FINAL_WARNING_THRESHOLD: u32 = 4;
pub const DELETION_THRESHOLD: u32 = 5;

pub const LOCKOUT_SECONDS: u64 = 60;
/// Reported lockout once an account is marked for deletion
pub const PERMANENT_LOCKOUT_SECONDS: u64 = 999_999;

pub const DEFAULT_CHECKING_FEE: f64 = 1.0;
pub const DEFAULT_SAVINGS_RATE: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SecurityState {
    /// 0-2 failed attempts
    Unlocked,
    /// 3 failed attempts, locked
    LockedWarning,
    /// 4 failed attempts, locked, last chance before deletion
    LockedFinal,
    /// 5 or more failed attempts; the next sweep removes the account
    MarkedForDeletion,
}

impl SecurityState {
    pub fn from_attempts(failed_attempts: u32) -> Self {
        match failed_attempts {
            n if n >= DELETION_THRESHOLD => SecurityState::MarkedForDeletion,
            FINAL_WARNING_THRESHOLD => SecurityState::LockedFinal,
            LOCK_THRESHOLD => SecurityState::LockedWarning,
            _ => SecurityState::Unlocked,
        }
    }

    pub fn lockout_seconds(&self) -> u64 {
        match self {
            SecurityState::Unlocked => 0,
            SecurityState::LockedWarning | SecurityState::LockedFinal => LOCKOUT_SECONDS,
            SecurityState::MarkedForDeletion => PERMANENT_LOCKOUT_SECONDS,
        }
    }

    pub fn is_locked(&self) -> bool {
        !matches!(self, SecurityState::Unlocked)
    }
}

/// Snapshot of an account's security status, surfaced before each login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockStatus {
    pub state: SecurityState,
    pub failed_attempts: u32,
    pub locked: bool,
    pub lockout_seconds: u64,
    pub attempts_remaining: u32,
}

// ============================================================================
// ACCOUNT KIND
// ============================================================================

/// Kinds a customer can open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Checking,
    Savings,
}

impl FromStr for AccountType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "checking" => Ok(AccountType::Checking),
            "savings" => Ok(AccountType::Savings),
            other => Err(LedgerError::invalid_input(format!(
                "unsupported account type '{}' (expected Checking or Savings)",
                other
            ))),
        }
    }
}

/// Closed set of account behaviours
#[derive(Debug, Clone, PartialEq)]
pub enum AccountKind {
    /// Unrecognized kind loaded from storage; label kept as-is
    Base(String),
    /// Flat fee added to every withdrawal
    Checking { fee: f64 },
    /// Interest rate applied on demand
    Savings { rate: f64 },
}

impl AccountKind {
    pub fn name(&self) -> &str {
        match self {
            AccountKind::Base(label) => label,
            AccountKind::Checking { .. } => "Checking",
            AccountKind::Savings { .. } => "Savings",
        }
    }

    /// Fee or rate, persisted as the trailing column
    pub fn extra(&self) -> Option<f64> {
        match self {
            AccountKind::Base(_) => None,
            AccountKind::Checking { fee } => Some(*fee),
            AccountKind::Savings { rate } => Some(*rate),
        }
    }

    pub fn withdrawal_fee(&self) -> f64 {
        match self {
            AccountKind::Checking { fee } => *fee,
            _ => 0.0,
        }
    }

    pub fn is_savings(&self) -> bool {
        matches!(self, AccountKind::Savings { .. })
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// ACCOUNT ENTITY
// ============================================================================

#[derive(Debug, Clone)]
pub struct Account {
    id: String,
    owner: String,
    kind: AccountKind,
    balance: f64,
    credential: Credential,
    recent: RecentTransactions,
    failed_attempts: u32,
    locked: bool,
    lockout_seconds: u64,
}

impl Account {
    /// Build an account in the Unlocked state
    pub fn new(
        id: String,
        owner: String,
        kind: AccountKind,
        balance: f64,
        credential: Credential,
    ) -> Self {
        Account {
            id,
            owner,
            kind,
            balance,
            credential,
            recent: RecentTransactions::new(),
            failed_attempts: 0,
            locked: false,
            lockout_seconds: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn kind(&self) -> &AccountKind {
        &self.kind
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn recent_transactions(&self) -> &RecentTransactions {
        &self.recent
    }

    // ========================================================================
    // SECURITY STATE MACHINE
    // ========================================================================

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lockout_seconds(&self) -> u64 {
        self.lockout_seconds
    }

    pub fn security_state(&self) -> SecurityState {
        SecurityState::from_attempts(self.failed_attempts)
    }

    pub fn should_be_deleted(&self) -> bool {
        self.failed_attempts >= DELETION_THRESHOLD
    }

    pub fn attempts_remaining(&self) -> u32 {
        DELETION_THRESHOLD.saturating_sub(self.failed_attempts)
    }

    pub fn lock_status(&self) -> LockStatus {
        LockStatus {
            state: self.security_state(),
            failed_attempts: self.failed_attempts,
            locked: self.locked,
            lockout_seconds: self.lockout_seconds,
            attempts_remaining: self.attempts_remaining(),
        }
    }

    /// Check a login attempt and advance the lockout state machine.
    ///
    /// A locked account records another failure without looking at the
    /// candidate. A successful login against a legacy plaintext credential
    /// re-stores it as a salted digest.
    pub fn validate_password(&mut self, candidate: &str) -> Result<()> {
        let status = self.lock_status();
        if status.state == SecurityState::MarkedForDeletion {
            tracing::warn!("Account {} is marked for deletion", self.id);
        } else if status.locked {
            tracing::warn!(
                "Account {} is locked for {}s, {} attempt(s) remaining before deletion",
                self.id,
                status.lockout_seconds,
                status.attempts_remaining
            );
        }

        if self.locked {
            self.record_failed_attempt();
            return Err(self.rejection());
        }

        if self.credential.verify(candidate) {
            self.reset_failed_attempts();
            if self.credential.is_legacy() {
                tracing::info!("Upgrading legacy credential for account {}", self.id);
                self.credential = Credential::new(candidate);
            }
            return Ok(());
        }

        self.record_failed_attempt();
        Err(self.rejection())
    }

    /// Count one more failure and move to the matching state
    pub fn record_failed_attempt(&mut self) -> SecurityState {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        let state = self.security_state();
        self.locked = state.is_locked();
        self.lockout_seconds = state.lockout_seconds();

        match state {
            SecurityState::Unlocked => tracing::warn!(
                "Failed login attempt {} of {} before temporary lockout on account {}",
                self.failed_attempts,
                LOCK_THRESHOLD,
                self.id
            ),
            SecurityState::LockedWarning => tracing::warn!(
                "Account {} locked for {}s after {} failed attempts",
                self.id,
                LOCKOUT_SECONDS,
                self.failed_attempts
            ),
            SecurityState::LockedFinal => tracing::warn!(
                "Account {} on final attempt before deletion",
                self.id
            ),
            SecurityState::MarkedForDeletion => tracing::warn!(
                "Account {} marked for deletion after {} failed attempts",
                self.id,
                self.failed_attempts
            ),
        }

        state
    }

    pub fn reset_failed_attempts(&mut self) {
        self.failed_attempts = 0;
        self.locked = false;
        self.lockout_seconds = 0;
    }

    fn rejection(&self) -> LedgerError {
        match self.security_state() {
            SecurityState::Unlocked => LedgerError::AuthenticationFailure {
                attempts_remaining: self.attempts_remaining(),
            },
            SecurityState::LockedWarning | SecurityState::LockedFinal => {
                LedgerError::SecurityLockout {
                    lockout_seconds: self.lockout_seconds,
                    attempts_remaining: self.attempts_remaining(),
                }
            }
            SecurityState::MarkedForDeletion => LedgerError::MarkedForDeletion {
                account_id: self.id.clone(),
            },
        }
    }

    // ========================================================================
    // BALANCE OPERATIONS
    // ========================================================================

    /// Credit the account and record it in the recent history
    pub fn deposit(&mut self, amount: f64, ids: &mut IdGenerator) -> Result<Transaction> {
        ensure_positive(amount)?;

        let balance = self.balance + amount;
        if !balance.is_finite() {
            return Err(LedgerError::invalid_input(format!(
                "deposit of {} would overflow the balance",
                amount
            )));
        }

        self.balance = balance;
        Ok(self.record(TransactionKind::Deposit, amount, ids))
    }

    /// Debit the account. Checking accounts add their fee to the debit;
    /// the recorded entry carries the full debited amount.
    pub fn withdraw(&mut self, amount: f64, ids: &mut IdGenerator) -> Result<Transaction> {
        ensure_positive(amount)?;

        let debit = amount + self.kind.withdrawal_fee();
        if debit > self.balance {
            return Err(LedgerError::InsufficientFunds {
                requested: debit,
                available: self.balance,
            });
        }

        self.balance -= debit;
        Ok(self.record(TransactionKind::Withdrawal, debit, ids))
    }

    /// Deposit `balance * rate` into a savings account.
    ///
    /// Returns `Ok(None)` for other kinds and when there is nothing to pay.
    pub fn apply_interest(&mut self, ids: &mut IdGenerator) -> Result<Option<Transaction>> {
        let rate = match self.kind {
            AccountKind::Savings { rate } => rate,
            _ => return Ok(None),
        };

        let interest = self.balance * rate;
        if interest <= 0.0 {
            return Ok(None);
        }
        self.deposit(interest, ids).map(Some)
    }

    fn record(&mut self, kind: TransactionKind, amount: f64, ids: &mut IdGenerator) -> Transaction {
        let transaction = Transaction::new(ids.next_transaction_id(), &self.id, kind, amount);
        self.recent.push(transaction.clone());
        transaction
    }
}

fn ensure_positive(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(LedgerError::invalid_input(format!(
            "amount must be greater than zero (got {})",
            amount
        )))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn create_test_account(kind: AccountKind, balance: f64) -> Account {
        Account::new(
            "ACC12345".to_string(),
            "Test Owner".to_string(),
            kind,
            balance,
            Credential::new("Correct#Horse1"),
        )
    }

    fn base_account(balance: f64) -> Account {
        create_test_account(AccountKind::Base("Basic".to_string()), balance)
    }

    #[test]
    fn test_new_account_is_unlocked() {
        let account = base_account(10.0);
        assert_eq!(account.security_state(), SecurityState::Unlocked);
        assert_eq!(account.failed_attempts(), 0);
        assert!(!account.is_locked());
        assert_eq!(account.lockout_seconds(), 0);
        assert!(account.recent_transactions().is_empty());
    }

    #[test]
    fn test_correct_password_succeeds() {
        let mut account = base_account(10.0);
        assert!(account.validate_password("Correct#Horse1").is_ok());
        assert_eq!(account.failed_attempts(), 0);
    }

    #[test]
    fn test_lockout_progression() {
        let mut account = base_account(10.0);

        for expected_remaining in [4, 3] {
            let err = account.validate_password("wrong").unwrap_err();
            assert!(matches!(
                err,
                LedgerError::AuthenticationFailure { attempts_remaining } if attempts_remaining == expected_remaining
            ));
            assert!(!account.is_locked());
        }

        // third failure locks
        let err = account.validate_password("wrong").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SecurityLockout);
        assert_eq!(account.security_state(), SecurityState::LockedWarning);
        assert!(account.is_locked());
        assert_eq!(account.lockout_seconds(), 60);

        // fourth attempt while locked still counts, even with the right password
        let err = account.validate_password("Correct#Horse1").unwrap_err();
        assert!(matches!(
            err,
            LedgerError::SecurityLockout { lockout_seconds: 60, attempts_remaining: 1 }
        ));
        assert_eq!(account.security_state(), SecurityState::LockedFinal);

        // fifth marks for deletion
        let err = account.validate_password("wrong").unwrap_err();
        assert!(matches!(err, LedgerError::MarkedForDeletion { .. }));
        assert!(account.should_be_deleted());
        assert_eq!(account.lockout_seconds(), PERMANENT_LOCKOUT_SECONDS);
        assert_eq!(account.attempts_remaining(), 0);
    }

    #[test]
    fn test_success_before_lock_resets_counter() {
        let mut account = base_account(10.0);
        account.validate_password("wrong").unwrap_err();
        account.validate_password("wrong").unwrap_err();
        assert_eq!(account.failed_attempts(), 2);

        account.validate_password("Correct#Horse1").unwrap();
        assert_eq!(account.failed_attempts(), 0);
        assert_eq!(account.lock_status().attempts_remaining, 5);
    }

    #[test]
    fn test_state_mapping() {
        assert_eq!(SecurityState::from_attempts(0), SecurityState::Unlocked);
        assert_eq!(SecurityState::from_attempts(2), SecurityState::Unlocked);
        assert_eq!(SecurityState::from_attempts(3), SecurityState::LockedWarning);
        assert_eq!(SecurityState::from_attempts(4), SecurityState::LockedFinal);
        assert_eq!(SecurityState::from_attempts(5), SecurityState::MarkedForDeletion);
        assert_eq!(SecurityState::from_attempts(9), SecurityState::MarkedForDeletion);
    }

    #[test]
    fn test_legacy_credential_upgraded_on_login() {
        let mut account = Account::new(
            "ACC54321".to_string(),
            "Legacy".to_string(),
            AccountKind::Checking { fee: 1.0 },
            0.0,
            Credential::parse("plainpass"),
        );
        assert!(account.credential().is_legacy());

        account.validate_password("plainpass").unwrap();
        assert!(!account.credential().is_legacy());
        assert!(account.credential().verify("plainpass"));
    }

    #[test]
    fn test_deposit_rejects_non_positive() {
        let mut ids = IdGenerator::seeded(1);
        let mut account = base_account(10.0);
        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(account.deposit(amount, &mut ids).is_err());
        }
        assert_eq!(account.balance(), 10.0);
        assert!(account.recent_transactions().is_empty());
    }

    #[test]
    fn test_deposit_rejects_overflow() {
        let mut ids = IdGenerator::seeded(1);
        let mut account = create_test_account(AccountKind::Savings { rate: 0.02 }, 0.0);
        account.deposit(1e308, &mut ids).unwrap();

        let err = account.deposit(1e308, &mut ids).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(account.balance(), 1e308);
        assert_eq!(account.recent_transactions().len(), 1);
    }

    #[test]
    fn test_deposit_and_withdraw() {
        let mut ids = IdGenerator::seeded(1);
        let mut account = base_account(10.0);

        let tx = account.deposit(5.0, &mut ids).unwrap();
        assert_eq!(tx.kind, TransactionKind::Deposit);
        assert_eq!(account.balance(), 15.0);

        account.withdraw(15.0, &mut ids).unwrap();
        assert_eq!(account.balance(), 0.0);
        assert_eq!(account.recent_transactions().len(), 2);
    }

    #[test]
    fn test_withdraw_more_than_balance_fails() {
        let mut ids = IdGenerator::seeded(1);
        let mut account = base_account(10.0);
        let err = account.withdraw(10.01, &mut ids).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(account.balance(), 10.0);
    }

    #[test]
    fn test_checking_fee_added_to_debit() {
        let mut ids = IdGenerator::seeded(1);
        let mut account = create_test_account(AccountKind::Checking { fee: 1.0 }, 150.0);

        assert!(account.withdraw(149.5, &mut ids).is_err());
        assert_eq!(account.balance(), 150.0);

        let tx = account.withdraw(100.0, &mut ids).unwrap();
        assert_eq!(account.balance(), 49.0);
        assert_eq!(tx.amount, 101.0);
    }

    #[test]
    fn test_savings_interest() {
        let mut ids = IdGenerator::seeded(1);
        let mut account = create_test_account(AccountKind::Savings { rate: 0.02 }, 1000.0);

        let tx = account.apply_interest(&mut ids).unwrap().unwrap();
        assert!((tx.amount - 20.0).abs() < 1e-9);
        assert!((account.balance() - 1020.0).abs() < 1e-9);
    }

    #[test]
    fn test_interest_skips_empty_and_non_savings() {
        let mut ids = IdGenerator::seeded(1);
        let mut empty = create_test_account(AccountKind::Savings { rate: 0.02 }, 0.0);
        assert!(empty.apply_interest(&mut ids).unwrap().is_none());

        let mut checking = create_test_account(AccountKind::Checking { fee: 1.0 }, 100.0);
        assert!(checking.apply_interest(&mut ids).unwrap().is_none());
        assert_eq!(checking.balance(), 100.0);
    }

    #[test]
    fn test_account_type_parsing() {
        assert_eq!("Checking".parse::<AccountType>().unwrap(), AccountType::Checking);
        assert_eq!(" savings ".parse::<AccountType>().unwrap(), AccountType::Savings);
        assert!("Brokerage".parse::<AccountType>().is_err());
    }

    #[test]
    fn test_kind_extra_column() {
        assert_eq!(AccountKind::Checking { fee: 2.5 }.extra(), Some(2.5));
        assert_eq!(AccountKind::Savings { rate: 0.03 }.extra(), Some(0.03));
        assert_eq!(AccountKind::Base("Legacy".to_string()).extra(), None);
        assert_eq!(AccountKind::Base("Legacy".to_string()).name(), "Legacy");
    }
}
