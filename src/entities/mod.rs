// Entity Models
//
// Accounts with their balance, credential and lockout state.

pub mod account;

pub use account::{Account, AccountKind, AccountType, LockStatus, SecurityState};
