use crate::{error::AppError, process::CommandRunner};

/// Which git configuration file a write targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    /// The current repository's `.git/config`
    Local,
    /// The user's `~/.gitconfig`
    Global,
}

impl ConfigScope {
    fn flag(self) -> &'static str {
        match self {
            ConfigScope::Local => "--local",
            ConfigScope::Global => "--global",
        }
    }
}

/// Reads a git config value, local falling back to global
///
/// Returns `None` when the key is unset.
///
/// # Arguments
/// * `key` - Git config key (user.name or user.email)
pub fn get_git_config(runner: &dyn CommandRunner, key: &str) -> Result<Option<String>, AppError> {
    let output = runner.run("git", &["config", "--get", key], None)?;

    // git exits with 1 when the key is missing
    if !output.success && output.code == Some(1) {
        return Ok(None);
    }

    let value = output.check(AppError::GitCommand)?.stdout.trim().to_string();
    Ok(Some(value))
}

/// Executes a Git config set command
///
/// # Arguments
/// * `scope` - Local repository or global user configuration
/// * `key` - Git config key to set (user.name or user.email)
/// * `value` - Value to set for key (username or email)
pub fn set_git_config(runner: &dyn CommandRunner, scope: ConfigScope, key: &str, value: &str) -> Result<(), AppError> {
    log::debug!("git config {} {key} {value}", scope.flag());
    runner
        .run("git", &["config", scope.flag(), key, value], None)?
        .check(AppError::GitCommand)?;
    Ok(())
}

/// Checks if current directory is in a Git repository for executing Git commands
pub fn is_inside_git_repo(runner: &dyn CommandRunner) -> Result<bool, AppError> {
    let output = runner.run("git", &["rev-parse", "--is-inside-work-tree"], None)?;

    // Outside of a work tree git fails instead of printing "false"
    if !output.success {
        log::debug!("rev-parse failed: {}", output.stderr.trim());
        return Ok(false);
    }

    Ok(output.stdout.trim() == "true")
}

/// Fails with `NotAGitRepo` unless the working directory is inside a work tree
pub fn require_git_repo(runner: &dyn CommandRunner) -> Result<(), AppError> {
    if is_inside_git_repo(runner)? {
        Ok(())
    } else {
        Err(AppError::NotAGitRepo)
    }
}

/// Points the origin remote at a new URL
pub fn set_origin_url(runner: &dyn CommandRunner, url: &str) -> Result<(), AppError> {
    runner
        .run("git", &["remote", "set-url", "origin", url], None)?
        .check(AppError::GitCommand)?;
    Ok(())
}

/// Extracts `owner/repo` (without `.git`) from a remote URL
///
/// Handles scp-like (`git@host:owner/repo.git`), `ssh://` and `https://` forms.
pub fn parse_remote_path(url: &str) -> Option<(String, String)> {
    let url = url.trim();
    let path = if let Some((_, rest)) = url.split_once("://") {
        rest.split_once('/')?.1
    } else {
        url.split_once(':')?.1
    };

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let (owner, repo) = path.rsplit_once('/')?;
    let owner = owner.rsplit('/').next()?;

    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

/// Builds the SSH remote URL that routes through the `Host <alias>` entry
pub fn aliased_remote_url(alias: &str, owner: &str, repo: &str) -> String {
    format!("git@{alias}:{owner}/{repo}.git")
}
