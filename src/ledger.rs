// 📒 Transaction ledger
//
// Two views of the same money movements:
// - RecentTransactions: per-account, bounded to the 10 most recent entries
// - TransactionLog: system-wide, append-only and unbounded
//
// Transaction records are immutable once committed.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Per-account history capacity
pub const RECENT_CAPACITY: usize = 10;

/// ctime-style, second precision (e.g. "Mon Oct 19 14:03:07 2026")
const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

// ============================================================================
// TRANSACTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A committed balance change. Field order is the persisted column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub kind: TransactionKind,
    pub amount: f64,
    pub date: String,
}

impl Transaction {
    pub fn new(id: String, account_id: &str, kind: TransactionKind, amount: f64) -> Self {
        Transaction {
            id,
            account_id: account_id.to_string(),
            kind,
            amount,
            date: timestamp_now(),
        }
    }

    /// Signed effect on the owning account's balance
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Deposit => self.amount,
            TransactionKind::Withdrawal => -self.amount,
        }
    }
}

// ============================================================================
// RECENT TRANSACTIONS (bounded, per account)
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct RecentTransactions {
    entries: VecDeque<Transaction>,
}

impl RecentTransactions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append, evicting the oldest entries beyond capacity
    pub fn push(&mut self, transaction: Transaction) {
        self.entries.push_back(transaction);
        while self.entries.len() > RECENT_CAPACITY {
            self.entries.pop_front();
        }
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Transaction> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// TRANSACTION LOG (unbounded, system-wide)
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct TransactionLog {
    entries: Vec<Transaction>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_transactions(entries: Vec<Transaction>) -> Self {
        TransactionLog { entries }
    }

    pub fn append(&mut self, transaction: Transaction) {
        self.entries.push(transaction);
    }

    pub fn all(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn for_account<'a>(&'a self, account_id: &'a str) -> impl Iterator<Item = &'a Transaction> {
        self.entries
            .iter()
            .filter(move |tx| tx.account_id == account_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of deposits and withdrawals recorded in the log
    pub fn totals(&self) -> (f64, f64) {
        self.entries
            .iter()
            .fold((0.0, 0.0), |(deposits, withdrawals), tx| match tx.kind {
                TransactionKind::Deposit => (deposits + tx.amount, withdrawals),
                TransactionKind::Withdrawal => (deposits, withdrawals + tx.amount),
            })
    }
}

// ============================================================================
// TESTS
// ============================================================================
