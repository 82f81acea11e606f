//! Input validation for API requests.
//!
//! Each check returns `Err(message)` on failure; collect them into an
//! `ApiError` with `ValidationErrorBuilder` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Loose email shape: something@domain.tld, no whitespace
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[^\s@]+@[^\s@]+\.[^\s@]+$"
    ).unwrap();

    /// Slot times in 24h HH:MM
    static ref SLOT_REGEX: Regex = Regex::new(
        r"^([01]\d|2[0-3]):[0-5]\d$"
    ).unwrap();
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name is required".to_string());
    }

    if trimmed.chars().count() > 100 {
        return Err("Name is too long (max 100 characters)".to_string());
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }

    Ok(())
}

/// Validate a required free-text field such as a medication name
pub fn validate_required(value: &str, label: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", label));
    }
    if value.len() > 500 {
        return Err(format!("{} is too long (max 500 characters)", label));
    }
    Ok(())
}

/// Every slot must be a distinct HH:MM time
pub fn validate_slots(slots: &[String]) -> Result<(), String> {
    for (i, slot) in slots.iter().enumerate() {
        if !SLOT_REGEX.is_match(slot) {
            return Err(format!("Invalid slot '{}', expected HH:MM", slot));
        }
        if slots[..i].contains(slot) {
            return Err(format!("Duplicate slot '{}'", slot));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("patient@example.com").is_ok());
        assert!(validate_email("dr.who+clinic@health.co.uk").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("spaces in@example.com").is_err());
        assert!(validate_email("nodomain@localhost").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Dr. Smith").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("doctor123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("Ibuprofen", "Medication name").is_ok());
        let err = validate_required(" ", "Dosage").unwrap_err();
        assert_eq!(err, "Dosage is required");
    }

    #[test]
    fn test_validate_slots() {
        let ok: Vec<String> = vec!["09:00".into(), "14:30".into(), "23:59".into()];
        assert!(validate_slots(&ok).is_ok());
        assert!(validate_slots(&[]).is_ok());

        assert!(validate_slots(&["9:00".to_string()]).is_err());
        assert!(validate_slots(&["24:00".to_string()]).is_err());
        assert!(validate_slots(&["09:00".to_string(), "09:00".to_string()]).is_err());
    }
}
