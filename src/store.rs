// 💾 Flat-file persistence
//
// One entity per line, comma separated, no header, no quoting:
//   accounts:     id,name,kind,balance,credential[,fee|rate]
//   transactions: id,accountId,kind,amount,date
//
// Loading is forgiving: a missing file is an empty collection and a
// malformed line is logged and skipped. Saving rewrites the whole file.

use crate::credential::Credential;
use crate::entities::account::{Account, AccountKind, DEFAULT_CHECKING_FEE, DEFAULT_SAVINGS_RATE};
use crate::error::Result;
use crate::ids::IdGenerator;
use crate::ledger::Transaction;
use crate::registry::AccountRegistry;
use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use std::fs;
use std::path::{Path, PathBuf};

const ACCOUNT_FIELDS: usize = 5;

/// Where accounts and transactions are loaded from and saved to
pub trait LedgerStore {
    fn load_accounts(&self) -> Result<Vec<Account>>;
    fn load_transactions(&self) -> Result<Vec<Transaction>>;
    fn save_accounts<'a, I>(&self, accounts: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Account>;
    fn save_transactions(&self, transactions: &[Transaction]) -> Result<()>;
}

/// Load both files and build a registry around them
pub fn load_registry<S: LedgerStore>(store: &S, ids: IdGenerator) -> Result<AccountRegistry> {
    let accounts = store.load_accounts()?;
    let transactions = store.load_transactions()?;
    tracing::info!(
        "Loaded {} account(s) and {} transaction(s)",
        accounts.len(),
        transactions.len()
    );
    Ok(AccountRegistry::from_records(accounts, transactions, ids))
}

pub fn save_registry<S: LedgerStore>(store: &S, registry: &AccountRegistry) -> Result<()> {
    store.save_accounts(registry.accounts())?;
    store.save_transactions(registry.ledger().all())?;
    tracing::info!(
        "Saved {} account(s) and {} transaction(s)",
        registry.len(),
        registry.ledger().len()
    );
    Ok(())
}

// ============================================================================
// FLAT FILE STORE
// ============================================================================

#[derive(Debug, Clone)]
pub struct FlatFileStore {
    accounts_path: PathBuf,
    transactions_path: PathBuf,
}

impl FlatFileStore {
    pub fn new(accounts_path: impl Into<PathBuf>, transactions_path: impl Into<PathBuf>) -> Self {
        FlatFileStore {
            accounts_path: accounts_path.into(),
            transactions_path: transactions_path.into(),
        }
    }

    pub fn accounts_path(&self) -> &Path {
        &self.accounts_path
    }

    pub fn transactions_path(&self) -> &Path {
        &self.transactions_path
    }
}

impl LedgerStore for FlatFileStore {
    fn load_accounts(&self) -> Result<Vec<Account>> {
        if !self.accounts_path.exists() {
            tracing::info!("No accounts file at {}", self.accounts_path.display());
            return Ok(Vec::new());
        }

        let mut rdr = reader_builder().from_path(&self.accounts_path)?;
        let mut accounts = Vec::new();

        for result in rdr.records() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    tracing::error!("Skipping unreadable account line: {}", e);
                    continue;
                }
            };

            match parse_account(&record) {
                Ok(account) => accounts.push(account),
                Err(reason) => tracing::error!(
                    "Skipping account line {}: {}",
                    line_number(&record),
                    reason
                ),
            }
        }

        Ok(accounts)
    }

    fn load_transactions(&self) -> Result<Vec<Transaction>> {
        if !self.transactions_path.exists() {
            tracing::info!("No transactions file at {}", self.transactions_path.display());
            return Ok(Vec::new());
        }

        let mut rdr = reader_builder().from_path(&self.transactions_path)?;
        let mut transactions = Vec::new();

        for result in rdr.deserialize::<Transaction>() {
            match result {
                Ok(transaction) => transactions.push(transaction),
                Err(e) => tracing::error!("Skipping transaction line: {}", e),
            }
        }

        Ok(transactions)
    }

    fn save_accounts<'a, I>(&self, accounts: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Account>,
    {
        ensure_parent(&self.accounts_path)?;
        let mut wtr = writer_builder().from_path(&self.accounts_path)?;
        for account in accounts {
            wtr.write_record(account_record(account))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn save_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        ensure_parent(&self.transactions_path)?;
        let mut wtr = writer_builder().from_path(&self.transactions_path)?;
        for transaction in transactions {
            wtr.serialize(transaction)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

// ============================================================================
// RECORD MAPPING
// ============================================================================

fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(false).flexible(true).quoting(false);
    builder
}

fn writer_builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .quote_style(QuoteStyle::Never);
    builder
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn line_number(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn account_record(account: &Account) -> Vec<String> {
    let mut fields = vec![
        account.id().to_string(),
        account.owner().to_string(),
        account.kind().name().to_string(),
        account.balance().to_string(),
        account.credential().to_stored(),
    ];
    if let Some(extra) = account.kind().extra() {
        fields.push(extra.to_string());
    }
    fields
}

fn parse_account(record: &StringRecord) -> std::result::Result<Account, String> {
    if record.len() < ACCOUNT_FIELDS {
        return Err(format!(
            "expected at least {} fields, found {}",
            ACCOUNT_FIELDS,
            record.len()
        ));
    }

    let field = |i: usize| record.get(i).unwrap_or_default();
    let id = field(0).trim();
    if id.is_empty() {
        return Err("empty account id".to_string());
    }

    let balance = parse_number(field(3), "balance")?;
    let extra = match record.get(ACCOUNT_FIELDS) {
        Some(raw) if !raw.trim().is_empty() => Some(parse_number(raw, "fee/rate")?),
        _ => None,
    };
    if let Some(value) = extra.filter(|value| *value < 0.0) {
        return Err(format!("negative fee/rate '{}'", value));
    }

    let kind = match field(2) {
        "Checking" => AccountKind::Checking {
            fee: extra.unwrap_or_else(|| {
                tracing::warn!("Checking account {} has no fee, using default", id);
                DEFAULT_CHECKING_FEE
            }),
        },
        "Savings" => AccountKind::Savings {
            rate: extra.unwrap_or_else(|| {
                tracing::warn!("Savings account {} has no rate, using default", id);
                DEFAULT_SAVINGS_RATE
            }),
        },
        other => AccountKind::Base(other.to_string()),
    };

    Ok(Account::new(
        id.to_string(),
        field(1).to_string(),
        kind,
        balance,
        Credential::parse(field(4)),
    ))
}

fn parse_number(raw: &str, what: &str) -> std::result::Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("invalid {} '{}'", what, raw))
}

// ============================================================================
// TESTS
// ============================================================================
