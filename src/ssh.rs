use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    account::public_key_path,
    error::AppError,
    process::CommandRunner,
};

/// Host every stanza routes to
const GITHUB_HOST: &str = "github.com";

/// Renders the `Host` stanza mapping an alias to its key
pub fn host_entry(alias: &str, identity_file: &Path) -> String {
    format!(
        "Host {alias}\n\tHostName {GITHUB_HOST}\n\tUser git\n\tIdentityFile {}\n\tIdentitiesOnly yes\n",
        identity_file.display()
    )
}

/// Returns the alias of a `Host` line naming exactly one pattern
fn host_line_alias(line: &str) -> Option<&str> {
    let mut words = line.split_whitespace();
    let keyword = words.next()?;
    if !keyword.eq_ignore_ascii_case("host") {
        return None;
    }
    let pattern = words.next()?;
    match words.next() {
        None => Some(pattern),
        Some(_) => None,
    }
}

fn starts_block(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|keyword| keyword.eq_ignore_ascii_case("host") || keyword.eq_ignore_ascii_case("match"))
}

/// Appends a stanza for `alias`, separated from existing content by a blank line
pub fn append_host_entry(content: &str, alias: &str, identity_file: &Path) -> String {
    let mut updated = content.to_string();
    if !updated.is_empty() {
        if !updated.ends_with('\n') {
            updated.push('\n');
        }
        if !updated.ends_with("\n\n") {
            updated.push('\n');
        }
    }
    updated.push_str(&host_entry(alias, identity_file));
    updated
}

/// Removes every stanza whose `Host` line names exactly `alias`
///
/// Returns the new content and whether anything was removed. Trailing blank
/// lines are dropped and a non-empty result always ends with a newline.
pub fn remove_host_entry(content: &str, alias: &str) -> (String, bool) {
    let mut kept: Vec<&str> = Vec::new();
    let mut skipping = false;
    let mut removed = false;

    for line in content.lines() {
        if host_line_alias(line) == Some(alias) {
            skipping = true;
            removed = true;
            continue;
        }
        if skipping {
            if line.trim().is_empty() {
                skipping = false;
                continue;
            }
            if !starts_block(line) {
                continue;
            }
            skipping = false;
        }
        kept.push(line);
    }

    if !removed {
        return (content.to_string(), false);
    }

    while kept.last().is_some_and(|line| line.trim().is_empty()) {
        kept.pop();
    }
    let mut updated = kept.join("\n");
    if !updated.is_empty() {
        updated.push('\n');
    }
    (updated, true)
}

pub fn has_host_entry(content: &str, alias: &str) -> bool {
    content.lines().any(|line| host_line_alias(line) == Some(alias))
}

fn read_or_empty(path: &Path) -> Result<String, AppError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(err.into()),
    }
}

/// Replaces the SSH config stanza for `alias` with one pointing at `identity_file`
pub fn write_host_entry(ssh_config: &Path, alias: &str, identity_file: &Path) -> Result<(), AppError> {
    let contents = read_or_empty(ssh_config)?;
    if has_host_entry(&contents, alias) {
        log::info!("replacing existing Host {alias} in {}", ssh_config.display());
    }
    let (without, _) = remove_host_entry(&contents, alias);
    let updated = append_host_entry(&without, alias, identity_file);

    if let Some(parent) = ssh_config.parent() {
        ensure_ssh_dir(parent)?;
    }
    fs::write(ssh_config, updated)?;
    log::info!("wrote Host {alias} to {}", ssh_config.display());
    Ok(())
}

/// Drops the stanzas of every listed alias, leaving the rest of the file alone
pub fn delete_host_entries(ssh_config: &Path, aliases: &[String]) -> Result<(), AppError> {
    let contents = read_or_empty(ssh_config)?;
    let mut updated = contents.clone();
    for alias in aliases {
        let (next, removed) = remove_host_entry(&updated, alias);
        if removed {
            log::info!("removed Host {alias} from {}", ssh_config.display());
        }
        updated = next;
    }

    if updated != contents {
        fs::write(ssh_config, updated)?;
    }
    Ok(())
}

/// Creates the SSH directory, restricted to the owner on unix
pub fn ensure_ssh_dir(dir: &Path) -> Result<(), AppError> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}

/// Normalises a user supplied key path to its private half and checks both halves exist
pub fn existing_key_pair(path: &Path) -> Result<PathBuf, AppError> {
    let private_key = match path.extension() {
        Some(ext) if ext == "pub" => path.with_extension(""),
        _ => path.to_path_buf(),
    };

    for file in [private_key.clone(), public_key_path(&private_key)] {
        if !file.is_file() {
            return Err(AppError::Validation(format!("ssh key not found: {}", file.display())));
        }
    }
    Ok(private_key)
}

/// Makes sure a key pair exists at `private_key`, generating one if needed
///
/// Returns `true` when ssh-keygen created a new pair.
///
/// # Arguments
/// * `private_key` - Target path of the private key
/// * `comment` - Key comment, usually the account email
/// * `passphrase` - Passphrase for the new key, empty for none
pub fn ensure_key_pair(
    runner: &dyn CommandRunner,
    private_key: &Path,
    comment: &str,
    passphrase: &str,
) -> Result<bool, AppError> {
    let public_key = public_key_path(private_key);
    let key_arg = private_key.to_string_lossy().into_owned();

    if private_key.is_file() && public_key.is_file() {
        log::info!("reusing existing key pair at {}", private_key.display());
        return Ok(false);
    }

    if private_key.is_file() {
        log::info!("deriving missing public key for {}", private_key.display());
        let output = runner
            .run("ssh-keygen", &["-y", "-f", key_arg.as_str()], None)
            .map_err(|err| AppError::Keygen(err.to_string()))?
            .check(AppError::Keygen)?;
        fs::write(&public_key, output.stdout)?;
        return Ok(false);
    }

    if let Some(dir) = private_key.parent() {
        ensure_ssh_dir(dir)?;
    }

    log::info!("generating ed25519 key at {}", private_key.display());
    runner
        .run("ssh-keygen", &["-t", "ed25519", "-C", comment, "-f", key_arg.as_str(), "-N", passphrase], None)
        .map_err(|err| AppError::Keygen(err.to_string()))?
        .check(AppError::Keygen)?;

    if !public_key.is_file() {
        return Err(AppError::Keygen(format!("no public key written to {}", public_key.display())));
    }
    Ok(true)
}

/// Deletes both halves of a key pair, ignoring files that are already gone
pub fn delete_key_pair(private_key: &Path) -> Result<(), AppError> {
    for file in [private_key.to_path_buf(), public_key_path(private_key)] {
        match fs::remove_file(&file) {
            Ok(()) => log::info!("deleted {}", file.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::process::fake::FakeRunner;

    const EXISTING: &str = "Host *\n\tAddKeysToAgent yes\n";

    #[test]
    fn test_append_then_remove_restores_content() {
        let added = append_host_entry(EXISTING, "work", Path::new("/k/id_ed25519_work"));
        assert!(added.starts_with(EXISTING));
        assert!(added.contains("\n\nHost work\n\tHostName github.com\n"));
        assert!(added.contains("\tIdentityFile /k/id_ed25519_work\n"));

        let (restored, removed) = remove_host_entry(&added, "work");
        assert!(removed);
        assert_eq!(restored, EXISTING);
    }

    #[test]
    fn test_round_trip_adds_missing_final_newline() {
        let unterminated = "Host *\n\tAddKeysToAgent yes";
        let added = append_host_entry(unterminated, "work", Path::new("/k/work"));
        assert!(added.starts_with("Host *\n\tAddKeysToAgent yes\n\nHost work\n"));

        let (restored, removed) = remove_host_entry(&added, "work");
        assert!(removed);
        assert_eq!(restored, format!("{unterminated}\n"));
    }

    #[test]
    fn test_remove_last_entry_leaves_empty_file() {
        let added = append_host_entry("", "work", Path::new("/k/work"));
        assert_eq!(remove_host_entry(&added, "work"), (String::new(), true));
    }

    #[test]
    fn test_remove_middle_entry_keeps_neighbours() {
        let content = append_host_entry(EXISTING, "work", Path::new("/k/work"));
        let content = append_host_entry(&content, "home", Path::new("/k/home"));

        let (updated, removed) = remove_host_entry(&content, "work");
        assert!(removed);
        assert!(!has_host_entry(&updated, "work"));
        assert!(has_host_entry(&updated, "home"));
        assert!(updated.starts_with(EXISTING));
        assert!(updated.contains("IdentityFile /k/home"));
    }

    #[test]
    fn test_remove_matches_alias_exactly() {
        let content = append_host_entry("", "workplace", Path::new("/k/wp"));
        let (updated, removed) = remove_host_entry(&content, "work");
        assert!(!removed);
        assert_eq!(updated, content);
    }

    #[test]
    fn test_remove_stops_at_next_host_without_blank_line() {
        let content = "Host work\n\tIdentityFile /k/work\nHost other\n\tUser git\n";
        let (updated, removed) = remove_host_entry(content, "work");
        assert!(removed);
        assert_eq!(updated, "Host other\n\tUser git\n");
    }

    #[test]
    fn test_multi_pattern_host_line_is_not_ours() {
        assert!(!has_host_entry("Host work other\n", "work"));
        assert!(has_host_entry("host work\n", "work"));
    }

    #[test]
    fn test_write_host_entry_replaces_previous() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_dir.path().join("ssh").join("config");

        write_host_entry(&config, "work", Path::new("/k/old")).unwrap();
        write_host_entry(&config, "work", Path::new("/k/new")).unwrap();

        let contents = fs::read_to_string(&config).unwrap();
        assert_eq!(contents.matches("Host work").count(), 1);
        assert!(contents.contains("/k/new"));
        assert!(!contents.contains("/k/old"));
    }

    #[test]
    fn test_delete_host_entries_on_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_dir.path().join("config");
        delete_host_entries(&config, &["work".to_string()]).unwrap();
        assert!(!config.exists());
    }

    #[test]
    fn test_ensure_key_pair_generates_then_reuses() {
        let temp_dir = TempDir::new().unwrap();
        let key = temp_dir.path().join(".ssh").join("id_ed25519_work");
        let runner = FakeRunner::default();

        assert!(ensure_key_pair(&runner, &key, "alice@co.com", "").unwrap());
        assert!(key.is_file());
        assert!(public_key_path(&key).is_file());

        assert!(!ensure_key_pair(&runner, &key, "alice@co.com", "").unwrap());
        let keygen_runs = runner.state.borrow().calls.iter().filter(|call| call[0] == "ssh-keygen").count();
        assert_eq!(keygen_runs, 1);
    }

    #[test]
    fn test_ensure_key_pair_derives_missing_public_key() {
        let temp_dir = TempDir::new().unwrap();
        let key = temp_dir.path().join("id_ed25519_work");
        fs::write(&key, "PRIVATE").unwrap();

        let generated = ensure_key_pair(&FakeRunner::default(), &key, "a@b.io", "").unwrap();
        assert!(!generated);
        assert_eq!(fs::read_to_string(public_key_path(&key)).unwrap(), "ssh-ed25519 AAAADERIVED\n");
    }

    #[test]
    fn test_keygen_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let runner = FakeRunner::default();
        runner.state.borrow_mut().keygen_fails = true;

        let result = ensure_key_pair(&runner, &temp_dir.path().join("id_x"), "a@b.io", "");
        assert!(matches!(result, Err(AppError::Keygen(_))));
    }

    #[test]
    fn test_existing_key_pair_accepts_public_path() {
        let temp_dir = TempDir::new().unwrap();
        let key = temp_dir.path().join("id_rsa");
        fs::write(&key, "PRIVATE").unwrap();
        fs::write(public_key_path(&key), "ssh-rsa AAAA").unwrap();

        assert_eq!(existing_key_pair(&public_key_path(&key)).unwrap(), key);
        assert_eq!(existing_key_pair(&key).unwrap(), key);
        assert!(matches!(
            existing_key_pair(&temp_dir.path().join("missing")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_delete_key_pair_tolerates_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let key = temp_dir.path().join("id_work");
        fs::write(&key, "PRIVATE").unwrap();

        delete_key_pair(&key).unwrap();
        assert!(!key.exists());
    }
}
