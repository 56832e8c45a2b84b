mod account;
mod cli;
mod clipboard;
mod config;
mod error;
mod git;
mod manager;
mod menu;
mod process;
mod ssh;
mod storage;
mod validation;

use clap::Parser;
use colored::Colorize;
use human_panic::setup_panic;
use log::LevelFilter;
use pretty_env_logger::formatted_builder;

use crate::{
    account::{Account, Store},
    cli::{Action, Cli},
    config::Paths,
    error::AppError,
    manager::{AccountManager, AddOutcome, CurrentAccount},
    menu::AddArgs,
    process::{CommandRunner, SystemRunner},
};

/// Menu entry for going back; never a valid alias
pub const BACK_OPTION: &str = "back";
/// Where GitHub expects new public keys
const GITHUB_KEYS_URL: &str = "https://github.com/settings/keys";

fn main() {
    setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli, &SystemRunner) {
        log::debug!("{err:?}");
        eprintln!("{} {}", "error:".red().bold(), err.to_string().red());
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = formatted_builder();
    builder.filter(None, level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

/// Loads the store, performs the requested action and saves the store if it changed
fn run(cli: Cli, runner: &dyn CommandRunner) -> Result<(), AppError> {
    let paths = Paths::resolve(cli.config_dir.clone(), cli.ssh_dir.clone())?;
    let store_file = paths.store_file();
    let manager = AccountManager::new(&paths, runner);

    let mut store: Store = storage::load_store(&store_file)?;

    let Some(action) = cli.action() else {
        return menu::run_menu(&manager, &mut store, &store_file);
    };
    log::debug!("running {action:?}");

    match &action {
        Action::Add => {
            let args = AddArgs {
                alias: cli.alias,
                username: cli.username,
                email: cli.email,
                ssh_key: cli.ssh_key,
                yes: cli.yes,
            };
            let new = menu::gather_new_account(&store, args)?;
            let alias = new.alias.clone();
            let outcome = manager.add(&mut store, new)?;
            print_add_outcome(&alias, &outcome);
        }
        Action::List => print_accounts(&store, &manager.list(&store)),
        Action::Switch(alias) => {
            manager.switch(&store, alias)?;
            println!("{} {}", "switched to account:".green(), alias);
        }
        Action::SetDefault(alias) => {
            manager.set_default(&mut store, alias)?;
            println!("{} {}", "default account set to:".green(), alias);
        }
        Action::Current => print_current(&manager.current(&store)?),
        Action::Remove(alias) => {
            manager.remove(&mut store, alias, cli.delete_keys)?;
            println!("{} {}", "removed account:".green(), alias);
        }
        Action::RemoveAll => {
            if !cli.yes && !confirm_remove_all(&store)? {
                println!("{}", "nothing removed".yellow());
                return Ok(());
            }
            let removed = manager.remove_all(&mut store, cli.delete_keys)?;
            println!("{} ({})", "all saved accounts removed".green(), removed.len());
        }
    }

    if action.mutates_store() {
        storage::save_store(&store_file, &store)?;
    }
    Ok(())
}

fn confirm_remove_all(store: &Store) -> Result<bool, AppError> {
    if store.is_empty() {
        return Ok(true);
    }
    let prompt = format!("remove all {} saved accounts?", store.accounts.len());
    Ok(inquire::Confirm::new(&format!("{}", prompt.yellow()))
        .with_default(false)
        .prompt()?)
}

/// Prints the result of adding an account, falling back to the key text when the clipboard failed
pub fn print_add_outcome(alias: &str, outcome: &AddOutcome) {
    if outcome.generated {
        println!("{} {}", "generated ssh key:".green(), outcome.ssh_key_path.display());
    } else {
        println!("{} {}", "using ssh key:".green(), outcome.ssh_key_path.display());
    }

    if outcome.copied_to_clipboard {
        println!("{}", "public ssh key copied to clipboard".green());
    } else {
        println!("{}", "could not copy to clipboard, public key:".yellow());
        println!("{}", outcome.public_key.trim());
    }
    println!("{} {}", "add it to your GitHub account:".blue(), GITHUB_KEYS_URL);
    println!("{} {}", "account added:".green(), alias);
}

/// Prints every stored account, marking the default
pub fn print_accounts(store: &Store, accounts: &[(&str, &Account)]) {
    if accounts.is_empty() {
        println!("{}", "no saved accounts".yellow());
        return;
    }

    for (alias, account) in accounts {
        let marker = if store.default.as_deref() == Some(*alias) { "*" } else { " " };
        println!(
            "{} {} {} <{}> {}",
            marker.green(),
            alias.bold(),
            account.username,
            account.email,
            account.ssh_key_path.display().to_string().dimmed()
        );
    }
}

/// Prints the identity git resolves and the alias it matches
pub fn print_current(current: &CurrentAccount) {
    let alias = current.alias.as_deref().unwrap_or("unknown");
    println!(
        "{} {} ({} <{}>)",
        "current account:".blue(),
        alias.bold(),
        current.username.as_deref().unwrap_or("unset"),
        current.email.as_deref().unwrap_or("unset")
    );
}
