//! Payment method / status values and amount rule.

use crate::error::CoreError;
use crate::types::Money;

pub const METHOD_CREDIT_CARD: &str = "credit_card";
pub const METHOD_CASH: &str = "cash";
pub const METHOD_DEBIT_CARD: &str = "debit_card";

pub const VALID_METHODS: &[&str] = &[METHOD_CREDIT_CARD, METHOD_CASH, METHOD_DEBIT_CARD];

pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_FAILED: &str = "failed";
pub const STATUS_PENDING: &str = "pending";

pub const VALID_STATUSES: &[&str] = &[STATUS_COMPLETED, STATUS_FAILED, STATUS_PENDING];

/// Status given to payments created without one.
pub const DEFAULT_STATUS: &str = STATUS_COMPLETED;

pub fn validate_method(method: &str) -> Result<(), CoreError> {
    if VALID_METHODS.contains(&method) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid payment method '{method}'. Must be one of: {}",
            VALID_METHODS.join(", ")
        )))
    }
}

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid payment status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}

pub fn validate_amount(amount: Money) -> Result<(), CoreError> {
    if amount > Money::ZERO {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Payment amount must be positive, got {amount}"
        )))
    }
}
