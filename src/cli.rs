use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser};

/// Actions other than `--add`; the add inputs make no sense with them
const NON_ADD_ACTIONS: [&str; 6] = ["list", "switch", "set_default", "current", "remove", "remove_all"];

/// CLI arguments parser using `clap`
#[derive(Parser, Debug)]
#[command(name = "git-account", version, about = "Command line utility to manage multiple GitHub accounts")]
#[command(group(
    ArgGroup::new("action")
        .args(["add", "list", "switch", "set_default", "current", "remove", "remove_all"])
        .multiple(false)
))]
pub struct Cli {
    /// Add a new GitHub account
    #[arg(long)]
    pub add: bool,
    /// List all saved GitHub accounts
    #[arg(long)]
    pub list: bool,
    /// Switch the current repository to an account
    #[arg(long, value_name = "ALIAS")]
    pub switch: Option<String>,
    /// Set the global default account
    #[arg(long, value_name = "ALIAS")]
    pub set_default: Option<String>,
    /// Show the account git currently uses
    #[arg(long)]
    pub current: bool,
    /// Remove a saved account
    #[arg(long, value_name = "ALIAS")]
    pub remove: Option<String>,
    /// Clear all saved accounts
    #[arg(long)]
    pub remove_all: bool,

    /// Alias for the new account
    #[arg(long, conflicts_with_all = NON_ADD_ACTIONS)]
    pub alias: Option<String>,
    /// GitHub username for the new account
    #[arg(long, conflicts_with_all = NON_ADD_ACTIONS)]
    pub username: Option<String>,
    /// Email for the new account
    #[arg(long, conflicts_with_all = NON_ADD_ACTIONS)]
    pub email: Option<String>,
    /// Existing SSH key (private or .pub) instead of generating one
    #[arg(long, value_name = "PATH", conflicts_with_all = NON_ADD_ACTIONS)]
    pub ssh_key: Option<PathBuf>,
    /// Overwrite an existing alias or skip the remove-all confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
    /// Also delete the key files of removed accounts
    #[arg(long)]
    pub delete_keys: bool,

    /// Directory holding the account store
    #[arg(long, value_name = "DIR", env = "GIT_ACCOUNT_HOME")]
    pub config_dir: Option<PathBuf>,
    /// SSH directory for keys and the client config
    #[arg(long, value_name = "DIR", env = "GIT_ACCOUNT_SSH_DIR")]
    pub ssh_dir: Option<PathBuf>,
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// The single action requested on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add,
    List,
    Switch(String),
    SetDefault(String),
    Current,
    Remove(String),
    RemoveAll,
}

impl Action {
    /// Whether the store must be written back after the action succeeds
    pub fn mutates_store(&self) -> bool {
        matches!(self, Action::Add | Action::SetDefault(_) | Action::Remove(_) | Action::RemoveAll)
    }
}

impl Cli {
    /// Maps the mutually exclusive flags to an action, `None` meaning interactive mode
    pub fn action(&self) -> Option<Action> {
        if self.add {
            Some(Action::Add)
        } else if self.list {
            Some(Action::List)
        } else if let Some(alias) = &self.switch {
            Some(Action::Switch(alias.clone()))
        } else if let Some(alias) = &self.set_default {
            Some(Action::SetDefault(alias.clone()))
        } else if self.current {
            Some(Action::Current)
        } else if let Some(alias) = &self.remove {
            Some(Action::Remove(alias.clone()))
        } else if self.remove_all {
            Some(Action::RemoveAll)
        } else {
            None
        }
    }
}
