//! Input validation for ticket and directory fields

use crate::error::{HelpdeskError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_EMAIL_LEN: usize = 150;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

/// Validate ticket title
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(HelpdeskError::InvalidInput(
            "Ticket title cannot be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(HelpdeskError::InvalidInput(format!(
            "Ticket title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate ticket description
pub fn validate_description(description: &str) -> Result<()> {
    if description.trim().is_empty() {
        return Err(HelpdeskError::InvalidInput(
            "Ticket description cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validate a person or category name (2 to 100 characters)
pub fn validate_name(name: &str) -> Result<()> {
    let len = name.trim().chars().count();
    if !(2..=100).contains(&len) {
        return Err(HelpdeskError::InvalidInput(format!(
            "Name must be between 2 and 100 characters, got {len}"
        )));
    }
    Ok(())
}

/// Validate an email address and return its normalized (lowercase) form
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.len() > MAX_EMAIL_LEN || !EMAIL_RE.is_match(&email) {
        return Err(HelpdeskError::InvalidInput(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_validation() {
        assert!(validate_title("Valid title").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());

        let long_title = "a".repeat(201);
        assert!(validate_title(&long_title).is_err());
        assert!(validate_title(&"a".repeat(200)).is_ok());
    }

    #[test]
    fn test_description_validation() {
        assert!(validate_description("Printer jams on page two").is_ok());
        assert!(validate_description(" ").is_err());
    }

    #[test]
    fn test_name_validation() {
        assert!(validate_name("Ana").is_ok());
        assert!(validate_name("A").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_email_normalization() {
        assert_eq!(
            normalize_email(" Maria.Garcia@Example.com ").unwrap(),
            "maria.garcia@example.com"
        );
        assert!(normalize_email("maria").is_err());
        assert!(normalize_email("maria@example").is_err());
    }
}
