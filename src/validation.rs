use colored::Colorize;
use inquire::Text;
use validator::ValidateEmail;

use crate::{account::Store, error::AppError, BACK_OPTION};

/// Maximum length for GitHub username
const MAX_USERNAME_LENGTH: usize = 39;
/// Maximum length for Git email address
const MAX_EMAIL_LENGTH: usize = 100;
/// Maximum length for account alias
const MAX_ALIAS_LENGTH: usize = 30;

/// Prompts user for input until valid input is provided
pub fn prompt_until_valid<F>(prompt_message: &str, input_validation: F) -> Result<String, AppError>
where
    F: Fn(&str) -> Result<(), AppError>,
{
    loop {
        let input: String = Text::new(prompt_message).prompt()?.trim().to_string();
        match input_validation(&input) {
            Ok(_) => break Ok(input),
            Err(AppError::Validation(msg)) => println!("{}", msg.red()),
            Err(e) => return Err(e),
        }
    }
}

// Validate input helper functions

/// Validates username input, ignoring the account stored under `alias`
pub fn validate_input_username(name: &str, alias: &str, store: &Store) -> Result<(), AppError> {
    if name.is_empty() {
        Err(AppError::Validation("Username cannot be empty".to_string()))
    } else if name.len() > MAX_USERNAME_LENGTH {
        Err(AppError::Validation(format!("Username too long (max {} characters)", MAX_USERNAME_LENGTH)))
    } else if store.iter().any(|(other, account)| other != alias && account.username == name) {
        Err(AppError::Validation("Username already exists".to_string()))
    } else {
        Ok(())
    }
}

/// Validates email input, ignoring the account stored under `alias`
pub fn validate_input_email(email: &str, alias: &str, store: &Store) -> Result<(), AppError> {
    if email.is_empty() {
        Err(AppError::Validation("Email cannot be empty".to_string()))
    } else if email.len() > MAX_EMAIL_LENGTH {
        Err(AppError::Validation(format!("Email too long (max {} characters)", MAX_EMAIL_LENGTH)))
    } else if !email.validate_email() {
        Err(AppError::Validation("Invalid email format".to_string()))
    } else if store.iter().any(|(other, account)| other != alias && account.email == email) {
        Err(AppError::Validation("Email already exists".to_string()))
    } else {
        Ok(())
    }
}

/// Validates an alias input
///
/// The alias doubles as an SSH `Host` name and a key file suffix, so it is
/// restricted to characters safe in both.
pub fn validate_input_alias(alias: &str) -> Result<(), AppError> {
    if alias.is_empty() {
        Err(AppError::Validation("Alias cannot be empty".to_string()))
    } else if alias.len() > MAX_ALIAS_LENGTH {
        Err(AppError::Validation(format!("Alias too long (max {} characters)", MAX_ALIAS_LENGTH)))
    } else if alias == BACK_OPTION {
        Err(AppError::Validation(format!("Alias cannot be '{BACK_OPTION}'")))
    } else if !alias.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')) {
        Err(AppError::Validation("Alias may only contain letters, digits, '-', '_' and '.'".to_string()))
    } else {
        Ok(())
    }
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

    #[test]
    fn test_alias_rules() {
        assert!(validate_input_alias("work").is_ok());
        assert!(validate_input_alias("my-work_2.0").is_ok());
        assert!(validate_input_alias("").is_err());
        assert!(validate_input_alias("back").is_err());
        assert!(validate_input_alias("two words").is_err());
        assert!(validate_input_alias("../etc").is_err());
        assert!(validate_input_alias(&"a".repeat(31)).is_err());
    }

    #[test]
    fn test_username_unique_across_other_aliases() {
        let store = store_with_work();
        assert!(validate_input_username("alice", "work", &store).is_ok());
        assert!(matches!(
            validate_input_username("alice", "home", &store),
            Err(AppError::Validation(_))
        ));
        assert!(validate_input_username(&"x".repeat(40), "home", &store).is_err());
    }

    #[test]
    fn test_email_format_and_uniqueness() {
        let store = store_with_work();
        assert!(validate_input_email("bob@home.net", "home", &store).is_ok());
        assert!(validate_input_email("not-an-email", "home", &store).is_err());
        assert!(validate_input_email("alice@co.com", "home", &store).is_err());
        assert!(validate_input_email("alice@co.com", "work", &store).is_ok());
    }
}
