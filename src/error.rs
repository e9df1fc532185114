// Ledger error taxonomy
//
// Every public ledger operation returns a definite success/failure signal.
// Authentication failures and lockouts are expected outcomes, not faults.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Account not found: {account_id}")]
    NotFound { account_id: String },

    #[error("Insufficient funds: requested {requested:.2}, available {available:.2}")]
    InsufficientFunds { requested: f64, available: f64 },

    #[error("Authentication failed ({attempts_remaining} attempt(s) remaining before deletion)")]
    AuthenticationFailure { attempts_remaining: u32 },

    #[error(
        "Account locked for {lockout_seconds} seconds ({attempts_remaining} attempt(s) remaining before deletion)"
    )]
    SecurityLockout {
        lockout_seconds: u64,
        attempts_remaining: u32,
    },

    #[error("Account {account_id} has been marked for deletion due to repeated failed logins")]
    MarkedForDeletion { account_id: String },

    #[error("Account {account_id} has been deleted due to repeated failed logins")]
    AccountDeleted { account_id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),
}

/// Coarse classification used by front ends to pick a message and exit path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    AuthenticationFailure,
    SecurityLockout,
    AccountDeleted,
    PersistenceError,
}

impl LedgerError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        LedgerError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn not_found(account_id: &str) -> Self {
        LedgerError::NotFound {
            account_id: account_id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidInput { .. } | LedgerError::InsufficientFunds { .. } => {
                ErrorKind::InvalidInput
            }
            LedgerError::NotFound { .. } => ErrorKind::NotFound,
            LedgerError::AuthenticationFailure { .. } => ErrorKind::AuthenticationFailure,
            LedgerError::SecurityLockout { .. } => ErrorKind::SecurityLockout,
            LedgerError::MarkedForDeletion { .. } | LedgerError::AccountDeleted { .. } => {
                ErrorKind::AccountDeleted
            }
            LedgerError::Io(_) | LedgerError::Csv(_) => ErrorKind::PersistenceError,
        }
    }

    /// True for outcomes that changed or reflect the account security state
    pub fn is_security_event(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::AuthenticationFailure
                | ErrorKind::SecurityLockout
                | ErrorKind::AccountDeleted
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
