//! Review rating and comment rules.

use crate::error::CoreError;

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

/// Maximum comment length (characters).
pub const MAX_COMMENT_LENGTH: usize = 500;

/// Ratings are stored rounded to one decimal place.
pub fn normalize_rating(rating: f64) -> f64 {
    (rating * 10.0).round() / 10.0
}

/// Validate a rating after normalisation.
pub fn validate_rating(rating: f64) -> Result<(), CoreError> {
    if rating.is_finite() && (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )))
    }
}

pub fn validate_comment(comment: &str) -> Result<(), CoreError> {
    let len = comment.chars().count();
    if len == 0 {
        return Err(CoreError::Validation("Comment must not be empty".to_string()));
    }
    if len > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}
