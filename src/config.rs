use std::path::PathBuf;

use crate::error::AppError;

/// Directory under the home directory holding the account store
const CONFIG_DIR_NAME: &str = ".git-account";
/// Account store file inside the config directory
const STORE_FILE_NAME: &str = "config.json";
/// Prefix of generated key files inside the SSH directory
const KEY_FILE_PREFIX: &str = "id_ed25519_";

/// Filesystem locations the tool reads and writes
#[derive(Debug, Clone)]
pub struct Paths {
    pub config_dir: PathBuf,
    pub ssh_dir: PathBuf,
}

impl Paths {
    /// Resolves locations, letting explicit overrides win over the home directory
    ///
    /// # Arguments
    /// * `config_dir` - Override for `~/.git-account`
    /// * `ssh_dir` - Override for `~/.ssh`
    pub fn resolve(config_dir: Option<PathBuf>, ssh_dir: Option<PathBuf>) -> Result<Self, AppError> {
        let home_dir = || dirs::home_dir().ok_or(AppError::HomeDirNotFound);

        let config_dir = match config_dir {
            Some(dir) => dir,
            None => home_dir()?.join(CONFIG_DIR_NAME),
        };
        let ssh_dir = match ssh_dir {
            Some(dir) => dir,
            None => home_dir()?.join(".ssh"),
        };

        log::debug!("config dir: {}, ssh dir: {}", config_dir.display(), ssh_dir.display());
        Ok(Self { config_dir, ssh_dir })
    }

    pub fn store_file(&self) -> PathBuf {
        self.config_dir.join(STORE_FILE_NAME)
    }

    pub fn ssh_config(&self) -> PathBuf {
        self.ssh_dir.join("config")
    }

    /// Conventional private key location for an alias
    pub fn key_path_for(&self, alias: &str) -> PathBuf {
        self.ssh_dir.join(format!("{KEY_FILE_PREFIX}{alias}"))
    }
}

/// Expands a leading `~/` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
