//! Input validation utilities

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use crate::models::{EmployeeFields, EmployeeStatus};

/// Minimum length of a new password
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Return the trimmed value if it is present and not blank
pub fn required(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

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

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a new password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }

    Ok(())
}

/// Validate that a date range does not end before it starts
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), String> {
    if end < start {
        return Err("end_date must not be before start_date".to_string());
    }

    Ok(())
}

/// Collect and validate the attributes of an employee record
pub fn employee_fields(
    name: Option<&str>,
    email: Option<&str>,
    role: Option<&str>,
    department: Option<&str>,
    status: Option<&str>,
) -> Result<EmployeeFields, String> {
    let (Some(name), Some(email), Some(role), Some(department), Some(status)) = (
        required(name),
        required(email),
        required(role),
        required(department),
        required(status),
    ) else {
        return Err("Missing fields".to_string());
    };

    validate_email(&email)?;
    let status: EmployeeStatus = status.parse()?;

    Ok(EmployeeFields {
        name,
        email,
        role,
        department,
        status,
    })
}
