//! User field rules shared by the repository checks and the API layer.

use crate::error::CoreError;

pub const GENDER_MALE: &str = "male";
pub const GENDER_FEMALE: &str = "female";

pub const VALID_GENDERS: &[&str] = &[GENDER_MALE, GENDER_FEMALE];

pub const MIN_AGE: i32 = 18;
pub const MAX_AGE: i32 = 70;

/// Minimum length of a login password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Emails are stored and compared in lowercase without surrounding spaces.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_gender(gender: &str) -> Result<(), CoreError> {
    if VALID_GENDERS.contains(&gender) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid gender '{gender}'. Must be one of: {}",
            VALID_GENDERS.join(", ")
        )))
    }
}

pub fn validate_age(age: i32) -> Result<(), CoreError> {
    if (MIN_AGE..=MAX_AGE).contains(&age) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Age must be between {MIN_AGE} and {MAX_AGE}, got {age}"
        )))
    }
}

/// Longitude in [-180, 180], latitude in [-90, 90].
pub fn validate_coordinates(longitude: f64, latitude: f64) -> Result<(), CoreError> {
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(CoreError::Validation(format!(
            "Longitude must be between -180 and 180, got {longitude}"
        )));
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(CoreError::Validation(format!(
            "Latitude must be between -90 and 90, got {latitude}"
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
