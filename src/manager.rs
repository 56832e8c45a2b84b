use std::{fs, path::PathBuf};

use crate::{
    account::{Account, Store},
    clipboard,
    config::Paths,
    error::AppError,
    git::{self, ConfigScope},
    process::CommandRunner,
    ssh,
    validation::{validate_input_alias, validate_input_email, validate_input_username},
};

/// Where the key pair for a new account comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Reuse or create the pair at the conventional path for the alias
    Generate,
    /// Use a pair the user already has (private or `.pub` path)
    Existing(PathBuf),
}

/// Everything `add` needs, gathered from flags or prompts beforehand
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub alias: String,
    pub username: String,
    pub email: String,
    pub key: KeySource,
    /// Passphrase for a generated key, empty for none
    pub passphrase: String,
    /// Replace an account already stored under the alias
    pub overwrite: bool,
}

/// Result of a successful `add`
#[derive(Debug)]
pub struct AddOutcome {
    pub ssh_key_path: PathBuf,
    pub generated: bool,
    pub copied_to_clipboard: bool,
    pub public_key: String,
}

/// Identity git currently resolves and the alias it belongs to
#[derive(Debug, PartialEq, Eq)]
pub struct CurrentAccount {
    pub alias: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Applies account operations against the filesystem and external tools
pub struct AccountManager<'a> {
    paths: &'a Paths,
    runner: &'a dyn CommandRunner,
}

impl<'a> AccountManager<'a> {
    pub fn new(paths: &'a Paths, runner: &'a dyn CommandRunner) -> Self {
        Self { paths, runner }
    }

    /// Stores a new account, preparing its key pair and SSH host entry
    ///
    /// Nothing is written when validation or the duplicate check fails.
    pub fn add(&self, store: &mut Store, new: NewAccount) -> Result<AddOutcome, AppError> {
        validate_input_alias(&new.alias)?;
        validate_input_username(&new.username, &new.alias, store)?;
        validate_input_email(&new.email, &new.alias, store)?;

        if store.contains(&new.alias) && !new.overwrite {
            return Err(AppError::DuplicateAlias(new.alias));
        }

        let (ssh_key_path, generated) = match &new.key {
            KeySource::Existing(path) => (ssh::existing_key_pair(path)?, false),
            KeySource::Generate => {
                let path = self.paths.key_path_for(&new.alias);
                let generated = ssh::ensure_key_pair(self.runner, &path, &new.email, &new.passphrase)?;
                (path, generated)
            }
        };

        let account = Account {
            username: new.username,
            email: new.email,
            ssh_key_path: ssh_key_path.clone(),
        };
        let public_key = fs::read_to_string(account.public_key_path())?;

        ssh::write_host_entry(&self.paths.ssh_config(), &new.alias, &ssh_key_path)?;
        if store.insert(&new.alias, account).is_some() {
            log::info!("overwrote account '{}'", new.alias);
        }

        let copied_to_clipboard = match clipboard::copy_to_clipboard(self.runner, &public_key) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("{err}");
                false
            }
        };

        Ok(AddOutcome { ssh_key_path, generated, copied_to_clipboard, public_key })
    }

    /// All accounts in alias order
    pub fn list<'s>(&self, store: &'s Store) -> Vec<(&'s str, &'s Account)> {
        store.iter().collect()
    }

    /// Points the current repository at the account's identity and key
    pub fn switch(&self, store: &Store, alias: &str) -> Result<(), AppError> {
        let account = lookup(store, alias)?;
        git::require_git_repo(self.runner)?;

        self.apply_identity(ConfigScope::Local, account)?;
        self.rewrite_origin(alias)?;
        Ok(())
    }

    /// Writes the account's identity to the global git config and remembers it as default
    pub fn set_default(&self, store: &mut Store, alias: &str) -> Result<(), AppError> {
        let account = lookup(store, alias)?;
        self.apply_identity(ConfigScope::Global, account)?;
        store.default = Some(alias.to_string());
        Ok(())
    }

    /// Reports the identity git resolves here and the alias matching it
    pub fn current(&self, store: &Store) -> Result<CurrentAccount, AppError> {
        let username = git::get_git_config(self.runner, "user.name")?;
        let email = git::get_git_config(self.runner, "user.email")?;

        let alias = match (&username, &email) {
            (Some(username), Some(email)) => store.find_by_identity(username, email).map(str::to_string),
            _ => None,
        };

        Ok(CurrentAccount { alias, username, email })
    }

    /// Deletes one account and its SSH host entry, optionally with its key files
    pub fn remove(&self, store: &mut Store, alias: &str, delete_keys: bool) -> Result<Account, AppError> {
        let account = store
            .remove(alias)
            .ok_or_else(|| AppError::UnknownAlias(alias.to_string()))?;

        ssh::delete_host_entries(&self.paths.ssh_config(), &[alias.to_string()])?;
        if delete_keys {
            self.delete_unshared_key(store, &account)?;
        }
        Ok(account)
    }

    /// Empties the store and removes every host entry it created
    ///
    /// Returns the aliases that were removed.
    pub fn remove_all(&self, store: &mut Store, delete_keys: bool) -> Result<Vec<String>, AppError> {
        let removed = store.clear();
        let aliases: Vec<String> = removed.keys().cloned().collect();

        ssh::delete_host_entries(&self.paths.ssh_config(), &aliases)?;
        if delete_keys {
            for account in removed.values() {
                ssh::delete_key_pair(&account.ssh_key_path)?;
            }
        }
        Ok(aliases)
    }

    fn apply_identity(&self, scope: ConfigScope, account: &Account) -> Result<(), AppError> {
        let public_key = account.public_key_path();
        git::set_git_config(self.runner, scope, "user.name", &account.username)?;
        git::set_git_config(self.runner, scope, "user.email", &account.email)?;
        git::set_git_config(self.runner, scope, "user.signingkey", &public_key.to_string_lossy())?;
        git::set_git_config(self.runner, scope, "core.sshCommand", &ssh_command(account))?;
        Ok(())
    }

    fn rewrite_origin(&self, alias: &str) -> Result<(), AppError> {
        let Some(url) = git::get_git_config(self.runner, "remote.origin.url")? else {
            log::debug!("no origin remote, leaving remotes alone");
            return Ok(());
        };

        match git::parse_remote_path(&url) {
            Some((owner, repo)) => {
                let aliased = git::aliased_remote_url(alias, &owner, &repo);
                if aliased != url {
                    git::set_origin_url(self.runner, &aliased)?;
                    log::info!("origin now {aliased}");
                }
            }
            None => log::warn!("could not parse origin url '{url}', leaving it unchanged"),
        }
        Ok(())
    }

    fn delete_unshared_key(&self, store: &Store, account: &Account) -> Result<(), AppError> {
        let shared = store.iter().any(|(_, other)| other.ssh_key_path == account.ssh_key_path);
        if shared {
            log::warn!("key {} is used by another account, keeping it", account.ssh_key_path.display());
            return Ok(());
        }
        ssh::delete_key_pair(&account.ssh_key_path)
    }
}

fn lookup<'s>(store: &'s Store, alias: &str) -> Result<&'s Account, AppError> {
    store.get(alias).ok_or_else(|| AppError::UnknownAlias(alias.to_string()))
}

/// `core.sshCommand` forcing the account's key
fn ssh_command(account: &Account) -> String {
    let key = account.ssh_key_path.to_string_lossy().replace('\'', r"'\''");
    format!("ssh -i '{key}' -o IdentitiesOnly=yes")
}
