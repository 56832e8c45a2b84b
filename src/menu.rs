use colored::Colorize;
use inquire::{Confirm, Password, PasswordDisplayMode, Select, Text};

use crate::{
    account::Store,
    config::expand_home,
    error::AppError,
    manager::{AccountManager, KeySource, NewAccount},
    print_add_outcome, print_accounts, print_current,
    storage::{check_if_accounts_exist, save_store},
    validation::{prompt_until_valid, validate_input_alias, validate_input_email, validate_input_username},
    BACK_OPTION,
};

/// Values already supplied on the command line for `--add`
#[derive(Debug, Default)]
pub struct AddArgs {
    pub alias: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub ssh_key: Option<std::path::PathBuf>,
    pub yes: bool,
}

/// Builds the input for `add`, prompting for anything missing
///
/// Prompts only run when at least one of alias, username or email was not given.
pub fn gather_new_account(store: &Store, args: AddArgs) -> Result<NewAccount, AppError> {
    let interactive = args.alias.is_none() || args.username.is_none() || args.email.is_none();

    let alias: String = match args.alias {
        Some(alias) => alias,
        None => prompt_until_valid(&format!("{}", "enter an alias for this account:".blue()), validate_input_alias)?,
    };

    let overwrite = if store.contains(&alias) && !args.yes && interactive {
        Confirm::new(&format!("{}", format!("alias '{alias}' already exists, overwrite it?").yellow()))
            .with_default(false)
            .prompt()?
    } else {
        args.yes
    };
    if store.contains(&alias) && !overwrite {
        return Err(AppError::DuplicateAlias(alias));
    }

    let username: String = match args.username {
        Some(username) => username,
        None => prompt_until_valid(&format!("{}", "enter your GitHub username:".blue()), |input| {
            validate_input_username(input, &alias, store)
        })?,
    };

    let email: String = match args.email {
        Some(email) => email,
        None => prompt_until_valid(&format!("{}", "enter your GitHub email:".blue()), |input| {
            validate_input_email(input, &alias, store)
        })?,
    };

    let key: KeySource = match args.ssh_key {
        Some(path) => KeySource::Existing(path),
        None if interactive => prompt_key_source()?,
        None => KeySource::Generate,
    };

    let passphrase: String = if key == KeySource::Generate && interactive {
        Password::new(&format!("{}", "passphrase for the new key (empty for none):".blue()))
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()?
    } else {
        String::new()
    };

    Ok(NewAccount { alias, username, email, key, passphrase, overwrite })
}

fn prompt_key_source() -> Result<KeySource, AppError> {
    let has_key = Confirm::new(&format!("{}", "do you already have an SSH key?".blue()))
        .with_default(false)
        .prompt()?;
    if !has_key {
        return Ok(KeySource::Generate);
    }

    let path: String = Text::new(&format!("{}", "enter your SSH key path:".blue())).prompt()?;
    Ok(KeySource::Existing(expand_home(path.trim())))
}

/// Runs interactive menu interface
///
/// Every action that changes the store saves it before returning to the menu.
pub fn run_menu(manager: &AccountManager<'_>, store: &mut Store, store_file: &std::path::Path) -> Result<(), AppError> {
    loop {
        let actions: Vec<&'static str> = vec![
            "switch account",
            "set default account",
            "add account",
            "remove account",
            "show current account",
            "show all accounts",
            "quit",
        ];

        let action_selected: &'static str = Select::new(&format!("{}", "select action".blue()), actions)
            .prompt()?;

        let result = match action_selected {
            "switch account" => menu_switch_account(manager, store),
            "set default account" => menu_set_default(manager, store, store_file),
            "add account" => menu_add_account(manager, store, store_file),
            "remove account" => menu_remove_account(manager, store, store_file),
            "show current account" => manager.current(store).map(|current| print_current(&current)),
            "show all accounts" => {
                print_accounts(store, &manager.list(store));
                Ok(())
            }
            "quit" => {
                println!("{}", "quitting".yellow());
                break Ok(());
            }
            _ => unreachable!("unexpected input"),
        };

        // Keep the menu alive on recoverable errors
        match result {
            Ok(()) => {}
            Err(err @ AppError::Inquire(_)) | Err(err @ AppError::StoreCorrupt { .. }) => return Err(err),
            Err(err) => println!("{}", err.to_string().red()),
        }
    }
}

/// Menu for switching accounts
fn menu_switch_account(manager: &AccountManager<'_>, store: &Store) -> Result<(), AppError> {
    let Some(alias) = select_alias(store, "select account to switch to:")? else {
        return Ok(());
    };
    manager.switch(store, &alias)?;
    println!("{} {}", "switched to account:".green(), alias);
    Ok(())
}

/// Menu for setting the global default
fn menu_set_default(manager: &AccountManager<'_>, store: &mut Store, store_file: &std::path::Path) -> Result<(), AppError> {
    let Some(alias) = select_alias(store, "select default account:")? else {
        return Ok(());
    };
    manager.set_default(store, &alias)?;
    save_store(store_file, store)?;
    println!("{} {}", "default account set to:".green(), alias);
    Ok(())
}

/// Menu for adding a new account
fn menu_add_account(manager: &AccountManager<'_>, store: &mut Store, store_file: &std::path::Path) -> Result<(), AppError> {
    let new = gather_new_account(store, AddArgs::default())?;
    let alias = new.alias.clone();
    let outcome = manager.add(store, new)?;
    save_store(store_file, store)?;
    print_add_outcome(&alias, &outcome);
    Ok(())
}

/// Menu for removing an account
fn menu_remove_account(manager: &AccountManager<'_>, store: &mut Store, store_file: &std::path::Path) -> Result<(), AppError> {
    let Some(alias) = select_alias(store, "select account to remove:")? else {
        return Ok(());
    };
    let delete_keys = Confirm::new(&format!("{}", "also delete its SSH key files?".blue()))
        .with_default(false)
        .prompt()?;

    manager.remove(store, &alias, delete_keys)?;
    save_store(store_file, store)?;
    println!("{} {}", "removed account:".green(), alias);
    Ok(())
}

/// Lets the user pick an alias, `None` when they chose to go back
fn select_alias(store: &Store, message: &str) -> Result<Option<String>, AppError> {
    check_if_accounts_exist(store)?;

    let user_aliases: Vec<String> = build_alias_list(store);
    let selected: String = Select::new(&format!("{}", message.blue()), user_aliases).prompt()?;

    Ok((selected != BACK_OPTION).then_some(selected))
}

/// Builds list of account aliases for menu to display
pub fn build_alias_list(store: &Store) -> Vec<String> {
    let mut user_aliases: Vec<String> = store.aliases();
    user_aliases.push(BACK_OPTION.to_string());
    user_aliases
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::account::Account;

    fn store_with_work() -> Store {
        let mut store = Store::default();
        store.insert(
            "work",
            Account {
                username: "alice".to_string(),
                email: "alice@co.com".to_string(),
                ssh_key_path: PathBuf::from("/k/work"),
            },
        );
        store
    }

    fn full_args(alias: &str) -> AddArgs {
        AddArgs {
            alias: Some(alias.to_string()),
            username: Some("bob".to_string()),
            email: Some("bob@co.com".to_string()),
            ssh_key: None,
            yes: false,
        }
    }

    #[test]
    fn test_full_flags_need_no_prompts() {
        let new = gather_new_account(&store_with_work(), full_args("home")).unwrap();
        assert_eq!(new.alias, "home");
        assert_eq!(new.key, KeySource::Generate);
        assert!(new.passphrase.is_empty());
        assert!(!new.overwrite);
    }

    #[test]
    fn test_existing_alias_without_yes_is_duplicate() {
        let result = gather_new_account(&store_with_work(), full_args("work"));
        assert!(matches!(result, Err(AppError::DuplicateAlias(alias)) if alias == "work"));
    }

    #[test]
    fn test_yes_confirms_overwrite() {
        let mut args = full_args("work");
        args.yes = true;
        args.ssh_key = Some(PathBuf::from("/k/id_rsa.pub"));

        let new = gather_new_account(&store_with_work(), args).unwrap();
        assert!(new.overwrite);
        assert_eq!(new.key, KeySource::Existing(PathBuf::from("/k/id_rsa.pub")));
    }

    #[test]
    fn test_alias_list_ends_with_back() {
        assert_eq!(build_alias_list(&store_with_work()), vec!["work".to_string(), BACK_OPTION.to_string()]);
    }
}
