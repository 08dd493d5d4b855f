//! Input validation for user management
//!
//! Only used when creating accounts. Login stays out of here on purpose: a
//! failed login must always answer with the one generic credentials error.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::NewUser;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if username.len() > 32 {
        return Err("Username must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_letter || !has_digit {
        return Err("Password must contain at least one letter and one digit".to_string());
    }

    Ok(())
}

/// Validate a user-creation payload, collecting every violation
pub fn validate_new_user(new_user: &NewUser) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_username(&new_user.username) {
        errors.push(e);
    }
    if let Err(e) = validate_password(&new_user.password) {
        errors.push(e);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
