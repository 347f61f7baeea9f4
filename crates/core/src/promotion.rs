//! Promotion kinds and window rules.

use crate::error::CoreError;
use crate::types::Timestamp;

pub const KIND_DISCOUNT: &str = "discount";
pub const KIND_TWO_FOR_ONE: &str = "two_for_one";
pub const KIND_COMBO: &str = "combo";

pub const VALID_KINDS: &[&str] = &[KIND_DISCOUNT, KIND_TWO_FOR_ONE, KIND_COMBO];

pub const MIN_DISCOUNT: f64 = 0.1;
pub const MAX_DISCOUNT: f64 = 0.5;

pub fn validate_kind(kind: &str) -> Result<(), CoreError> {
    if VALID_KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid promotion kind '{kind}'. Must be one of: {}",
            VALID_KINDS.join(", ")
        )))
    }
}

/// A `discount` promotion needs a discount fraction in range; other kinds
/// may carry one, but it must still be in range.
pub fn validate_discount(kind: &str, discount: Option<f64>) -> Result<(), CoreError> {
    match discount {
        None if kind == KIND_DISCOUNT => Err(CoreError::Validation(
            "A discount is required for promotions of kind 'discount'".to_string(),
        )),
        None => Ok(()),
        Some(d) if (MIN_DISCOUNT..=MAX_DISCOUNT).contains(&d) => Ok(()),
        Some(d) => Err(CoreError::Validation(format!(
            "Discount must be between {MIN_DISCOUNT} and {MAX_DISCOUNT}, got {d}"
        ))),
    }
}

pub fn validate_window(starts_at: Timestamp, ends_at: Timestamp) -> Result<(), CoreError> {
    if ends_at < starts_at {
        return Err(CoreError::Validation(
            "Promotion end must not be before its start".to_string(),
        ));
    }
    Ok(())
}
