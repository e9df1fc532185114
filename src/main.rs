use anyhow::{bail, Context, Result};
use bank_ledger::config::{CliConfig, Command, Validate};
use bank_ledger::logger::init_cli_logger;
use bank_ledger::menu::{self, Menu};
use bank_ledger::registry::AccountRegistry;
use bank_ledger::store::{load_registry, save_registry, FlatFileStore};
use bank_ledger::strength::StrengthReport;
use clap::Parser;
use std::io::{self, Write};

fn main() -> Result<()> {
    let config = CliConfig::parse();
    init_cli_logger(config.verbose);
    config.validate().context("invalid configuration")?;

    match config.command() {
        Command::Strength { password } => run_strength(&password),
        Command::Menu => {
            let (store, mut registry) = open_registry(&config)?;
            run_menu(&mut registry)?;
            persist(&store, &registry)
        }
        Command::List => {
            let (_, registry) = open_registry(&config)?;
            let mut stdout = io::stdout().lock();
            menu::render_accounts(&mut stdout, &registry)?;
            writeln!(
                stdout,
                "{} account(s), {} ledger entr{}, total balance ${:.2}",
                registry.len(),
                registry.ledger().len(),
                if registry.ledger().len() == 1 { "y" } else { "ies" },
                registry.total_balance()
            )?;
            Ok(())
        }
        Command::ApplyInterest => {
            let (store, mut registry) = open_registry(&config)?;
            let paid = registry.apply_interest_to_all();
            println!("💰 Interest applied to {} savings account(s)", paid.len());
            for transaction in &paid {
                println!("   {} +{:.2}", transaction.account_id, transaction.amount);
            }
            persist(&store, &registry)
        }
        #[cfg(feature = "tui")]
        Command::Browse => {
            let (_, registry) = open_registry(&config)?;
            let mut app = bank_ledger::ui::App::from_registry(&registry);
            bank_ledger::ui::run_ui(&mut app)
        }
    }
}

fn open_registry(config: &CliConfig) -> Result<(FlatFileStore, AccountRegistry)> {
    let store = FlatFileStore::new(&config.accounts_file, &config.transactions_file);
    let registry = load_registry(&store, config.id_generator())
        .with_context(|| {
            format!(
                "failed to load {} / {}",
                store.accounts_path().display(),
                store.transactions_path().display()
            )
        })?
        .with_defaults(config.account_defaults());
    Ok((store, registry))
}

fn run_menu(registry: &mut AccountRegistry) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut menu = Menu::new(stdin.lock(), stdout.lock());
    menu.run(registry)?;
    Ok(())
}

fn persist(store: &FlatFileStore, registry: &AccountRegistry) -> Result<()> {
    save_registry(store, registry).with_context(|| {
        format!(
            "failed to save {} / {}",
            store.accounts_path().display(),
            store.transactions_path().display()
        )
    })
}

fn run_strength(password: &str) -> Result<()> {
    let Some(report) = StrengthReport::analyze(password) else {
        bail!("password cannot be empty");
    };
    let mut stdout = io::stdout().lock();
    menu::render_strength_report(&mut stdout, &report)?;
    Ok(())
}
