// 🖥️ Interactive menu
//
// Line-oriented front end over an AccountRegistry. Owns prompting and input
// parsing; every ledger decision is made by the registry. Generic over the
// input/output streams so sessions can be scripted in tests.

use crate::entities::account::{AccountType, SecurityState};
use crate::error::LedgerError;
use crate::registry::AccountRegistry;
use crate::strength::{self, StrengthReport};
use std::io::{self, BufRead, Write};

const RULE_WIDTH: usize = 54;

pub struct Menu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Menu { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until the user exits or input ends
    pub fn run(&mut self, registry: &mut AccountRegistry) -> io::Result<()> {
        writeln!(self.output, "Welcome to the Banking System")?;

        loop {
            self.show_main_menu()?;
            let Some(choice) = self.read_line()? else {
                writeln!(self.output)?;
                break;
            };

            match choice.trim().parse::<u32>() {
                Ok(1) => self.create_account(registry)?,
                Ok(2) => self.login(registry)?,
                Ok(3) => render_accounts(&mut self.output, registry)?,
                Ok(4) => self.password_check()?,
                Ok(5) => self.apply_interest(registry)?,
                Ok(6) => {
                    writeln!(self.output, "Thank you for using the Banking System. Goodbye!")?;
                    break;
                }
                Ok(_) => writeln!(
                    self.output,
                    "Invalid choice. Please enter a number between 1 and 6."
                )?,
                Err(_) => writeln!(
                    self.output,
                    "Invalid input. Please enter a number between 1 and 6."
                )?,
            }
        }

        Ok(())
    }

    fn show_main_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n===== Banking System Menu =====")?;
        writeln!(self.output, "1. Create New Account")?;
        writeln!(self.output, "2. Login to Account")?;
        writeln!(self.output, "3. Display All Accounts")?;
        writeln!(self.output, "4. Test Password Strength")?;
        writeln!(self.output, "5. Apply Interest to Savings Accounts")?;
        writeln!(self.output, "6. Exit")?;
        writeln!(self.output, "==============================")?;
        write!(self.output, "Enter your choice: ")?;
        self.output.flush()
    }

    fn show_account_menu(&mut self, account_id: &str) -> io::Result<()> {
        writeln!(self.output, "\n===== Account {} Menu =====", account_id)?;
        writeln!(self.output, "1. Check Balance")?;
        writeln!(self.output, "2. Deposit Money")?;
        writeln!(self.output, "3. Withdraw Money")?;
        writeln!(self.output, "4. Recent Transactions")?;
        writeln!(self.output, "5. Close Account")?;
        writeln!(self.output, "6. Back to Main Menu")?;
        writeln!(self.output, "==============================")?;
        write!(self.output, "Enter your choice: ")?;
        self.output.flush()
    }

    // ========================================================================
    // MAIN MENU ACTIONS
    // ========================================================================

    fn create_account(&mut self, registry: &mut AccountRegistry) -> io::Result<()> {
        let Some(name) = self.prompt("Enter your name: ")? else {
            return Ok(());
        };
        let Some(raw_type) = self.prompt("Select account type (Checking/Savings): ")? else {
            return Ok(());
        };
        let account_type = match raw_type.parse::<AccountType>() {
            Ok(account_type) => account_type,
            Err(e) => {
                writeln!(self.output, "{}", e)?;
                writeln!(self.output, "Failed to create account. Please try again.")?;
                return Ok(());
            }
        };
        let Some(raw_balance) = self.prompt("Enter initial deposit amount: $")? else {
            return Ok(());
        };
        let Ok(initial_balance) = raw_balance.trim().parse::<f64>() else {
            writeln!(self.output, "Invalid input. Please enter a numeric amount.")?;
            return Ok(());
        };
        let Some(password) = self.prompt("Create a password: ")? else {
            return Ok(());
        };

        let score = strength::score(&password);
        if score < strength::WEAK_THRESHOLD {
            writeln!(self.output, "Warning: Password is weak (strength: {}/10)", score)?;
            writeln!(
                self.output,
                "Consider using a stronger password with uppercase, lowercase, numbers, and special characters."
            )?;
        }

        match registry.create_account(&name, account_type, initial_balance, &password) {
            Ok(id) => {
                writeln!(
                    self.output,
                    "Account created successfully. Your account number is: {}",
                    id
                )?;
            }
            Err(e) => {
                writeln!(self.output, "{}", e)?;
                writeln!(self.output, "Failed to create account. Please try again.")?;
            }
        }
        Ok(())
    }

    fn login(&mut self, registry: &mut AccountRegistry) -> io::Result<()> {
        let Some(account_id) = self.prompt("Enter account ID: ")? else {
            return Ok(());
        };
        let account_id = account_id.trim().to_string();
        let Some(password) = self.prompt("Enter password: ")? else {
            return Ok(());
        };

        if let Some(account) = registry.find(&account_id) {
            let status = account.lock_status();
            if status.state == SecurityState::MarkedForDeletion {
                writeln!(
                    self.output,
                    "This account has been marked for deletion due to security concerns."
                )?;
            } else if status.locked {
                writeln!(
                    self.output,
                    "Account is temporarily locked due to multiple failed login attempts."
                )?;
                writeln!(
                    self.output,
                    "Please try again after {} seconds.",
                    status.lockout_seconds
                )?;
                writeln!(
                    self.output,
                    "Remaining attempts before deletion: {}",
                    status.attempts_remaining
                )?;
            }
        }

        match registry.validate_account(&account_id, &password) {
            Ok(()) => {
                writeln!(self.output, "Login successful!")?;
                self.account_session(registry, &account_id)
            }
            Err(e) => {
                writeln!(self.output, "{}", describe_login_failure(&e))?;
                writeln!(self.output, "Invalid account ID or password.")
            }
        }
    }

    fn password_check(&mut self) -> io::Result<()> {
        let Some(password) = self.prompt("Enter a password to test its strength: ")? else {
            return Ok(());
        };

        match StrengthReport::analyze(&password) {
            Some(report) => render_strength_report(&mut self.output, &report),
            None => writeln!(
                self.output,
                "Error: Empty password. Please try again with a non-empty password."
            ),
        }
    }

    fn apply_interest(&mut self, registry: &mut AccountRegistry) -> io::Result<()> {
        let paid = registry.apply_interest_to_all();
        if paid.is_empty() {
            return writeln!(self.output, "No savings accounts earned interest.");
        }
        for transaction in &paid {
            writeln!(
                self.output,
                "Interest of ${:.2} paid into {}",
                transaction.amount, transaction.account_id
            )?;
        }
        writeln!(
            self.output,
            "Interest applied to {} savings account(s).",
            paid.len()
        )
    }

    // ========================================================================
    // ACCOUNT SUBMENU
    // ========================================================================

    fn account_session(&mut self, registry: &mut AccountRegistry, account_id: &str) -> io::Result<()> {
        loop {
            if !registry.contains(account_id) {
                return Ok(());
            }
            self.show_account_menu(account_id)?;
            let Some(choice) = self.read_line()? else {
                return Ok(());
            };

            match choice.trim().parse::<u32>() {
                Ok(1) => {
                    if let Some(account) = registry.find(account_id) {
                        writeln!(self.output, "Account Balance: ${:.2}", account.balance())?;
                    }
                }
                Ok(2) => {
                    let Some(amount) = self.prompt_amount("Enter amount to deposit: $")? else {
                        continue;
                    };
                    match registry.deposit(account_id, amount) {
                        Ok(_) => writeln!(self.output, "Deposit successful!")?,
                        Err(e) => {
                            writeln!(self.output, "{}", e)?;
                            writeln!(self.output, "Deposit failed. Please try again.")?;
                        }
                    }
                }
                Ok(3) => {
                    let Some(amount) = self.prompt_amount("Enter amount to withdraw: $")? else {
                        continue;
                    };
                    match registry.withdraw(account_id, amount) {
                        Ok(_) => writeln!(self.output, "Withdrawal successful!")?,
                        Err(e) => {
                            writeln!(self.output, "{}", e)?;
                            writeln!(
                                self.output,
                                "Withdrawal failed. Insufficient funds or invalid amount."
                            )?;
                        }
                    }
                }
                Ok(4) => {
                    if let Some(account) = registry.find(account_id) {
                        let recent = account.recent_transactions();
                        if recent.is_empty() {
                            writeln!(self.output, "No recent transactions.")?;
                        }
                        for tx in recent.iter() {
                            writeln!(
                                self.output,
                                "{}  {:<10} {:>12.2}  {}",
                                tx.id, tx.kind, tx.amount, tx.date
                            )?;
                        }
                    }
                }
                Ok(5) => {
                    let Some(password) = self.prompt("Enter password to confirm account closure: ")?
                    else {
                        return Ok(());
                    };
                    match registry.close_account(account_id, &password) {
                        Ok(closed) => {
                            writeln!(self.output, "Account closed successfully!")?;
                            writeln!(self.output, "Final balance: ${:.2}", closed.balance())?;
                            return Ok(());
                        }
                        Err(e) => {
                            writeln!(self.output, "{}", describe_login_failure(&e))?;
                            writeln!(self.output, "Failed to close account. Incorrect password.")?;
                        }
                    }
                }
                Ok(6) => return Ok(()),
                Ok(_) => writeln!(
                    self.output,
                    "Invalid choice. Please enter a number between 1 and 6."
                )?,
                Err(_) => writeln!(
                    self.output,
                    "Invalid input. Please enter a number between 1 and 6."
                )?,
            }
        }
    }

    // ========================================================================
    // INPUT HELPERS
    // ========================================================================

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;
        self.read_line()
    }

    /// Positive amount, or None after telling the user what was wrong
    fn prompt_amount(&mut self, label: &str) -> io::Result<Option<f64>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        match raw.trim().parse::<f64>() {
            Ok(amount) if amount > 0.0 => Ok(Some(amount)),
            Ok(_) => {
                writeln!(self.output, "Amount must be greater than zero.")?;
                Ok(None)
            }
            Err(_) => {
                writeln!(self.output, "Invalid input. Please enter a numeric amount.")?;
                Ok(None)
            }
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn describe_login_failure(error: &LedgerError) -> String {
    match error {
        LedgerError::AuthenticationFailure { attempts_remaining } => format!(
            "Warning: Failed login attempt. {} attempt(s) remaining before account deletion.",
            attempts_remaining
        ),
        LedgerError::SecurityLockout {
            lockout_seconds,
            attempts_remaining: 1,
        } => format!(
            "CRITICAL WARNING: This is your LAST attempt before account deletion! Account remains locked for {} seconds.",
            lockout_seconds
        ),
        LedgerError::SecurityLockout {
            lockout_seconds, ..
        } => format!(
            "WARNING: Account locked for {} seconds due to failed login attempts. After 5 failed attempts, your account will be DELETED.",
            lockout_seconds
        ),
        LedgerError::MarkedForDeletion { .. } => {
            "This account has been marked for deletion due to security concerns.".to_string()
        }
        LedgerError::AccountDeleted { account_id } => format!(
            "SECURITY ALERT: Account {} has been DELETED due to multiple failed login attempts.",
            account_id
        ),
        LedgerError::NotFound { .. } => "Account not found or invalid credentials.".to_string(),
        other => other.to_string(),
    }
}

/// Table of all accounts (id, owner, kind, balance)
pub fn render_accounts<W: Write>(out: &mut W, registry: &AccountRegistry) -> io::Result<()> {
    if registry.is_empty() {
        return writeln!(out, "No accounts found.");
    }

    writeln!(out, "\n===== All Accounts =====")?;
    writeln!(
        out,
        "{:<12}{:<20}{:<10}{:>12}",
        "Account ID", "Customer Name", "Type", "Balance"
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    for account in registry.accounts() {
        writeln!(
            out,
            "{:<12}{:<20}{:<10}{:>12.2}",
            account.id(),
            account.owner(),
            account.kind().name(),
            account.balance()
        )?;
    }
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

pub fn render_strength_report<W: Write>(out: &mut W, report: &StrengthReport) -> io::Result<()> {
    writeln!(out, "Password Strength: {}/10", report.score)?;
    writeln!(out, "Estimated time to crack: {}", report.crack_time)?;
    writeln!(
        out,
        "{} Password. {}",
        report.rating.as_str(),
        report.rating.description()
    )?;

    writeln!(out, "\nSimulating password crack attempt...")?;
    if report.cracked {
        writeln!(out, "{} 100% Complete!", report.progress_bar())?;
        writeln!(out, "Password cracked in: {}", report.crack_time)?;
    } else {
        writeln!(
            out,
            "{} {}% Complete",
            report.progress_bar(),
            report.progress_percent
        )?;
        writeln!(out, "Password crack attempt stopped after 1 hour of trying.")?;
        writeln!(out, "Estimated total time required: {}", report.crack_time)?;
    }

    if !report.suggestions.is_empty() {
        writeln!(out, "\nSuggestions to improve password strength:")?;
        for tip in &report.suggestions {
            writeln!(out, "- {}", tip)?;
        }
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdGenerator;
    use std::io::Cursor;

    const PASSWORD: &str = "Menu#Pass123";

    fn run_session(registry: &mut AccountRegistry, script: &str) -> String {
        let mut menu = Menu::new(Cursor::new(script.to_string()), Vec::new());
        menu.run(registry).unwrap();
        String::from_utf8(menu.into_output()).unwrap()
    }

    fn registry_with_account() -> (AccountRegistry, String) {
        let mut registry = AccountRegistry::with_generator(IdGenerator::seeded(31));
        let id = registry
            .create_account("Menu User", AccountType::Checking, 100.0, PASSWORD)
            .unwrap();
        (registry, id)
    }

    #[test]
    fn test_exit_and_eof() {
        let mut registry = AccountRegistry::with_generator(IdGenerator::seeded(1));
        let output = run_session(&mut registry, "6\n");
        assert!(output.contains("Goodbye!"));

        let output = run_session(&mut registry, "");
        assert!(output.contains("Welcome to the Banking System"));
    }

    #[test]
    fn test_invalid_choices() {
        let mut registry = AccountRegistry::with_generator(IdGenerator::seeded(1));
        let output = run_session(&mut registry, "abc\n9\n6\n");
        assert!(output.contains("Invalid input. Please enter a number between 1 and 6."));
        assert!(output.contains("Invalid choice. Please enter a number between 1 and 6."));
    }

    #[test]
    fn test_create_account_flow() {
        let mut registry = AccountRegistry::with_generator(IdGenerator::seeded(1));
        let output = run_session(&mut registry, "1\nJane Doe\nsavings\n250\nabc\n3\n6\n");

        assert!(output.contains("Warning: Password is weak (strength: 0/10)"));
        assert!(output.contains("Your account number is: ACC"));
        assert_eq!(registry.len(), 1);
        assert!(output.contains("Jane Doe"));
        assert!(output.contains("250.00"));
    }

    #[test]
    fn test_create_account_rejects_unknown_type() {
        let mut registry = AccountRegistry::with_generator(IdGenerator::seeded(1));
        let output = run_session(&mut registry, "1\nJane\nBrokerage\n6\n");
        assert!(output.contains("Failed to create account"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_login_deposit_withdraw() {
        let (mut registry, id) = registry_with_account();
        let script = format!("2\n{}\n{}\n2\n50\n3\n149.5\n3\n100\n1\n4\n6\n6\n", id, PASSWORD);
        let output = run_session(&mut registry, &script);

        assert!(output.contains("Login successful!"));
        assert!(output.contains("Deposit successful!"));
        assert!(output.contains("Withdrawal failed."));
        assert!(output.contains("Withdrawal successful!"));
        assert!(output.contains("Account Balance: $49.00"));
        assert_eq!(registry.ledger().len(), 2);
    }

    #[test]
    fn test_amount_validation() {
        let (mut registry, id) = registry_with_account();
        let script = format!("2\n{}\n{}\n2\n-5\n2\nten\n6\n6\n", id, PASSWORD);
        let output = run_session(&mut registry, &script);

        assert!(output.contains("Amount must be greater than zero."));
        assert!(output.contains("Invalid input. Please enter a numeric amount."));
        assert!(registry.ledger().is_empty());
    }

    #[test]
    fn test_repeated_failed_logins_delete_account() {
        let (mut registry, id) = registry_with_account();
        let script = format!("2\n{id}\nx\n2\n{id}\nx\n2\n{id}\nx\n2\n{id}\nx\n2\n{id}\nx\n6\n");
        let output = run_session(&mut registry, &script);

        assert!(output.contains("Account is temporarily locked"));
        assert!(output.contains("CRITICAL WARNING"));
        assert!(output.contains("SECURITY ALERT"));
        assert!(!registry.contains(&id));
    }

    #[test]
    fn test_close_account_flow() {
        let (mut registry, id) = registry_with_account();
        let script = format!("2\n{}\n{}\n5\n{}\n6\n", id, PASSWORD, PASSWORD);
        let output = run_session(&mut registry, &script);

        assert!(output.contains("Account closed successfully!"));
        assert!(output.contains("Final balance: $100.00"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_password_check() {
        let mut registry = AccountRegistry::with_generator(IdGenerator::seeded(1));
        let output = run_session(&mut registry, "4\n   \n4\nabc12345\n6\n");

        assert!(output.contains("Error: Empty password."));
        assert!(output.contains("Password Strength: 4/10"));
        assert!(output.contains("Weak Password."));
        assert!(output.contains("Add uppercase letters"));
    }

    #[test]
    fn test_apply_interest_option() {
        let mut registry = AccountRegistry::with_generator(IdGenerator::seeded(1));
        registry
            .create_account("Saver", AccountType::Savings, 1000.0, PASSWORD)
            .unwrap();
        let output = run_session(&mut registry, "5\n6\n");
        assert!(output.contains("Interest of $20.00 paid into ACC"));
    }

    #[test]
    fn test_render_accounts_empty() {
        let registry = AccountRegistry::with_generator(IdGenerator::seeded(1));
        let mut out = Vec::new();
        render_accounts(&mut out, &registry).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No accounts found.\n");
    }
}
