//! Contact form field validation

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub const REQUIRED: &str = "This field is required";
pub const INVALID_EMAIL: &str = "Please enter a valid email address";

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;
pub const MESSAGE_MIN: usize = 10;
pub const MESSAGE_MAX: usize = 2000;

/// Simplified RFC 5322 shape check
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn validate_required(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some(REQUIRED.to_string())
    } else {
        None
    }
}

/// Required, and at least `min` characters once trimmed
pub fn validate_min_length(value: &str, min: usize) -> Option<String> {
    validate_required(value).or_else(|| {
        (value.trim().chars().count() < min).then(|| format!("Must be at least {min} characters"))
    })
}

pub fn validate_max_length(value: &str, max: usize) -> Option<String> {
    (value.chars().count() > max).then(|| format!("Must be {max} characters or less"))
}

pub fn validate_email(email: &str) -> Option<String> {
    validate_required(email)
        .or_else(|| (!is_valid_email(email)).then(|| INVALID_EMAIL.to_string()))
}

pub fn validate_name(name: &str) -> Option<String> {
    validate_min_length(name, NAME_MIN).or_else(|| validate_max_length(name, NAME_MAX))
}

pub fn validate_message(message: &str) -> Option<String> {
    validate_min_length(message, MESSAGE_MIN).or_else(|| validate_max_length(message, MESSAGE_MAX))
}
