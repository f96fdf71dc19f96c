use rately_domain::Role;

use crate::error::ApiError;

/// Characters counted as "special" by the password policy.
const SPECIALS: &str = "!@#$%^&*";

fn invalid(message: &str) -> ApiError {
    ApiError::InvalidInput(message.to_string())
}

/// User names are 20-60 characters.
pub fn validate_user_name(name: &str) -> Result<(), ApiError> {
    let len = name.chars().count();
    if !(20..=60).contains(&len) {
        return Err(invalid(
            "Name is required and must be between 20-60 characters",
        ));
    }
    Ok(())
}

/// Minimal shape check: `local@domain.tld`, no whitespace, a single `@`.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        return Err(invalid("Valid email is required"));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    // The domain needs a dot with at least one character on each side.
    match domain.rfind('.') {
        Some(i) => i > 0 && i < domain.len() - 1,
        None => false,
    }
}

/// Passwords are 8-16 characters drawn from letters, digits and
/// [`SPECIALS`], with at least one uppercase letter and one special.
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if !is_valid_password(password) {
        return Err(invalid(
            "Password must be 8-16 characters with at least one uppercase letter and one special character",
        ));
    }
    Ok(())
}

/// Same policy as [`validate_password`], with the message used when
/// changing an existing password.
pub fn validate_new_password(password: &str) -> Result<(), ApiError> {
    if !is_valid_password(password) {
        return Err(invalid(
            "New password must be 8-16 characters with at least one uppercase letter and one special character",
        ));
    }
    Ok(())
}

fn is_valid_password(password: &str) -> bool {
    let len = password.chars().count();
    if !(8..=16).contains(&len) {
        return false;
    }
    if !password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || SPECIALS.contains(c))
    {
        return false;
    }
    password.chars().any(|c| c.is_ascii_uppercase()) && password.chars().any(|c| SPECIALS.contains(c))
}

/// Optional mailing address, at most 400 characters.
pub fn validate_user_address(address: Option<&str>) -> Result<(), ApiError> {
    if let Some(address) = address {
        if address.chars().count() > 400 {
            return Err(invalid("Address must be less than 400 characters"));
        }
    }
    Ok(())
}

pub fn validate_store_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(invalid("Store name is required"));
    }
    Ok(())
}

pub fn validate_store_address(address: &str) -> Result<(), ApiError> {
    if address.trim().is_empty() {
        return Err(invalid("Address is required"));
    }
    Ok(())
}

pub fn validate_rating_value(rating: i16) -> Result<(), ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(invalid("Rating must be between 1 and 5"));
    }
    Ok(())
}

pub fn parse_role(role: &str) -> Result<Role, ApiError> {
    Role::parse(role).ok_or_else(|| invalid("Role must be one of: user, store_owner, admin"))
}
