use std::path::PathBuf;

use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Error during file I/O operations
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Error while serializing the store
    #[error("json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    /// Error when user input fails.
    #[error("inquire error: {0}")]
    Inquire(#[from] inquire::InquireError),
    /// Error when executing Git commands
    #[error("git command failed: {0}")]
    GitCommand(String),
    /// Error when current directory is not a Git repository
    #[error("not in a git repository")]
    NotAGitRepo,
    /// Error during input validation.
    #[error("validation error: {0}")]
    Validation(String),
    /// Alias is already stored and overwriting was not confirmed
    #[error("alias already exists: '{0}'")]
    DuplicateAlias(String),
    /// Error when specific account alias is not found.
    #[error("account alias not found: '{0}'")]
    UnknownAlias(String),
    /// ssh-keygen could not produce the key pair
    #[error("ssh key generation failed: {0}")]
    Keygen(String),
    /// Store file exists but cannot be parsed
    #[error("account store {path} is corrupt: {reason}")]
    StoreCorrupt { path: PathBuf, reason: String },
    #[error("clipboard error: {0}")]
    Clipboard(String),
    #[error("failed to find the home directory")]
    HomeDirNotFound,
    /// Error during UTF-8 conversion.
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
}
