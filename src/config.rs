// ⚙️ Command-line configuration
//
// Data file locations, fee/rate defaults for new accounts, an optional
// fixed RNG seed, and the subcommand to run (interactive menu by default).

use crate::error::{LedgerError, Result};
use crate::ids::IdGenerator;
use crate::registry::AccountDefaults;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "bank-ledger")]
#[command(about = "Single-node account ledger with progressive login lockout")]
pub struct CliConfig {
    #[arg(long, default_value = "data/accounts.csv")]
    pub accounts_file: PathBuf,

    #[arg(long, default_value = "data/transactions.csv")]
    pub transactions_file: PathBuf,

    /// Fee added to every withdrawal from new checking accounts
    #[arg(long, default_value_t = 1.0)]
    pub checking_fee: f64,

    /// Interest rate for new savings accounts (0.02 = 2%)
    #[arg(long, default_value_t = 0.02)]
    pub savings_rate: f64,

    /// Seed the id generator for a reproducible session
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Interactive banking menu (default)
    Menu,
    /// Print every account
    List,
    /// Score a password and estimate its crack time
    Strength { password: String },
    /// Pay interest into all savings accounts and save
    ApplyInterest,
    /// Full-screen account and ledger browser
    #[cfg(feature = "tui")]
    Browse,
}

impl CliConfig {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Menu)
    }

    pub fn account_defaults(&self) -> AccountDefaults {
        AccountDefaults {
            checking_fee: self.checking_fee,
            savings_rate: self.savings_rate,
        }
    }

    pub fn id_generator(&self) -> IdGenerator {
        match self.seed {
            Some(seed) => IdGenerator::seeded(seed),
            None => IdGenerator::new(),
        }
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("accounts_file", &self.accounts_file)?;
        validate_path("transactions_file", &self.transactions_file)?;
        if self.accounts_file == self.transactions_file {
            return Err(LedgerError::invalid_input(
                "accounts_file and transactions_file must differ",
            ));
        }
        validate_range("checking_fee", self.checking_fee, 0.0, f64::MAX)?;
        validate_range("savings_rate", self.savings_rate, 0.0, 1.0)?;
        Ok(())
    }
}

pub fn validate_path(field_name: &str, path: &Path) -> Result<()> {
    let raw = path.to_string_lossy();
    if raw.trim().is_empty() {
        return Err(LedgerError::invalid_input(format!(
            "{}: path cannot be empty",
            field_name
        )));
    }
    if raw.contains('\0') {
        return Err(LedgerError::invalid_input(format!(
            "{}: path contains null bytes",
            field_name
        )));
    }
    Ok(())
}

pub fn validate_range(field_name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(LedgerError::invalid_input(format!(
            "{}: {} must be between {} and {}",
            field_name, value, min, max
        )));
    }
    Ok(())
}
