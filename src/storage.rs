use std::{collections::BTreeMap, fs, io::ErrorKind, path::Path};

use serde::Deserialize;

use crate::{
    account::{Account, Store},
    config::expand_home,
    error::AppError,
};

/// Accepted on-disk layouts; older stores were a bare alias map
#[derive(Deserialize)]
#[serde(untagged)]
enum StoreFile {
    Current(Store),
    Legacy(BTreeMap<String, Account>),
}

/// Loads the account store, returning an empty one when the file is missing or blank
///
/// # Arguments
/// * `path` - Location of the JSON store
pub fn load_store(path: &Path) -> Result<Store, AppError> {
    let file_contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            log::debug!("no store at {}, starting empty", path.display());
            return Ok(Store::default());
        }
        Err(err) => return Err(err.into()),
    };

    if file_contents.trim().is_empty() {
        return Ok(Store::default());
    }

    let parsed: StoreFile = serde_json::from_str(&file_contents).map_err(|err| AppError::StoreCorrupt {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    Ok(match parsed {
        StoreFile::Current(store) => store,
        StoreFile::Legacy(accounts) => {
            log::info!("upgrading legacy store layout at {}", path.display());
            let accounts = accounts
                .into_iter()
                .map(|(alias, account)| (alias, upgrade_legacy_account(account)))
                .collect();
            Store { default: None, accounts }
        }
    })
}

/// Legacy records point at the public key, often with an unexpanded `~/`
fn upgrade_legacy_account(mut account: Account) -> Account {
    let stored = account.ssh_key_path.to_string_lossy().into_owned();
    let expanded = expand_home(&stored);
    account.ssh_key_path = match expanded.extension() {
        Some(ext) if ext == "pub" => expanded.with_extension(""),
        _ => expanded,
    };
    account
}

/// Saves the account store, writing a sibling file first and renaming it into place
///
/// # Arguments
/// * `path` - Location of the JSON store
/// * `store` - Store to persist
pub fn save_store(path: &Path, store: &Store) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json: String = serde_json::to_string_pretty(store)?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, json)?;
    fs::rename(&staging, path)?;

    log::debug!("saved {} account(s) to {}", store.accounts.len(), path.display());
    Ok(())
}

/// Checks if any accounts exist in storage
pub fn check_if_accounts_exist(store: &Store) -> Result<(), AppError> {
    if store.is_empty() {
        return Err(AppError::Validation("no accounts found".to_string()));
    }
    Ok(())
}
