// Bank Ledger - Library
// Accounts, lockout-guarded authentication, transactions and flat-file persistence

pub mod config;
pub mod credential;
pub mod entities;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod logger;
pub mod menu;
pub mod registry;
pub mod store;
pub mod strength;

// Only compile the browser when the TUI feature is enabled
#[cfg(feature = "tui")]
pub mod ui;

pub use credential::Credential;
pub use entities::{Account, AccountKind, AccountType, LockStatus, SecurityState};
pub use error::{ErrorKind, LedgerError, Result};
pub use ids::IdGenerator;
pub use ledger::{RecentTransactions, Transaction, TransactionKind, TransactionLog};
pub use registry::{AccountDefaults, AccountRegistry};
pub use store::{load_registry, save_registry, FlatFileStore, LedgerStore};
pub use strength::{StrengthRating, StrengthReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
