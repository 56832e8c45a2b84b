use std::{collections::BTreeMap, path::PathBuf};

use serde::{Deserialize, Serialize};

/// A GitHub identity stored under its alias
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// GitHub username, written to user.name
    pub username: String,
    /// Email address, written to user.email
    pub email: String,
    /// Private key path; the public key sits next to it with a `.pub` suffix
    pub ssh_key_path: PathBuf,
}

impl Account {
    pub fn public_key_path(&self) -> PathBuf {
        public_key_path(&self.ssh_key_path)
    }
}

/// Appends `.pub` to a private key path
pub fn public_key_path(private_key: &std::path::Path) -> PathBuf {
    let mut path = private_key.as_os_str().to_owned();
    path.push(".pub");
    PathBuf::from(path)
}

/// Every stored account keyed by alias, plus the alias last set as default
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Store {
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub accounts: BTreeMap<String, Account>,
}

impl Store {
    pub fn get(&self, alias: &str) -> Option<&Account> {
        self.accounts.get(alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.accounts.contains_key(alias)
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Accounts in alias order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Account)> {
        self.accounts.iter().map(|(alias, account)| (alias.as_str(), account))
    }

    pub fn aliases(&self) -> Vec<String> {
        self.accounts.keys().cloned().collect()
    }

    /// Finds the alias whose record carries both the given name and email
    pub fn find_by_identity(&self, username: &str, email: &str) -> Option<&str> {
        self.iter()
            .find(|(_, account)| account.username == username && account.email == email)
            .map(|(alias, _)| alias)
    }

    pub fn insert(&mut self, alias: &str, account: Account) -> Option<Account> {
        self.accounts.insert(alias.to_string(), account)
    }

    /// Removes an account, clearing the default pointer when it referenced it
    pub fn remove(&mut self, alias: &str) -> Option<Account> {
        let removed = self.accounts.remove(alias);
        if removed.is_some() && self.default.as_deref() == Some(alias) {
            self.default = None;
        }
        removed
    }

    pub fn clear(&mut self) -> BTreeMap<String, Account> {
        self.default = None;
        std::mem::take(&mut self.accounts)
    }
}
