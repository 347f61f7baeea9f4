//! Typed result of the validation step that runs before every write.
//!
//! Repositories probe field rules and natural-key uniqueness themselves and
//! report the outcome as a [`WriteCheck`], so callers never depend on the
//! storage engine's error codes to tell "invalid" from "duplicate".

use validator::{ValidationErrors, ValidationErrorsKind};

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCheck {
    Ok,
    /// A natural key is already taken.
    Conflict(String),
    /// A field breaks a rule.
    Invalid(String),
}

impl WriteCheck {
    pub fn is_ok(&self) -> bool {
        matches!(self, WriteCheck::Ok)
    }

    /// Run the next check only if this one passed.
    pub fn and_then(self, next: impl FnOnce() -> WriteCheck) -> WriteCheck {
        match self {
            WriteCheck::Ok => next(),
            failed => failed,
        }
    }

    /// Fold a domain-rule result into a check.
    pub fn from_rule(rule: Result<(), CoreError>) -> WriteCheck {
        match rule {
            Ok(()) => WriteCheck::Ok,
            Err(CoreError::Conflict(msg)) => WriteCheck::Conflict(msg),
            Err(CoreError::Validation(msg)) => WriteCheck::Invalid(msg),
            Err(other) => WriteCheck::Invalid(other.to_string()),
        }
    }

    /// Convert `validator` derive output into a check.
    pub fn from_validation(result: Result<(), ValidationErrors>) -> WriteCheck {
        match result {
            Ok(()) => WriteCheck::Ok,
            Err(errors) => WriteCheck::Invalid(describe_validation_errors(&errors)),
        }
    }

    pub fn into_result(self) -> Result<(), CoreError> {
        match self {
            WriteCheck::Ok => Ok(()),
            WriteCheck::Conflict(msg) => Err(CoreError::Conflict(msg)),
            WriteCheck::Invalid(msg) => Err(CoreError::Validation(msg)),
        }
    }
}

/// Flatten `validator` errors into one readable line, e.g.
/// `"age: range; email: email"`. Field order is alphabetical.
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .errors()
        .iter()
        .map(|(field, kind)| match kind {
            ValidationErrorsKind::Field(errs) => {
                let reasons: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                format!("{field}: {}", reasons.join(", "))
            }
            _ => format!("{field}: invalid"),
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "must not be empty"))]
        name: String,
        #[validate(range(min = 18, max = 70))]
        age: i32,
    }

    #[test]
    fn and_then_short_circuits_on_failure() {
        let check = WriteCheck::Invalid("bad".into()).and_then(|| WriteCheck::Conflict("dup".into()));
        assert_eq!(check, WriteCheck::Invalid("bad".into()));

        let check = WriteCheck::Ok.and_then(|| WriteCheck::Conflict("dup".into()));
        assert_eq!(check, WriteCheck::Conflict("dup".into()));
    }

    #[test]
    fn into_result_maps_to_core_errors() {
        assert!(WriteCheck::Ok.into_result().is_ok());
        assert_matches!(
            WriteCheck::Conflict("x".into()).into_result(),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            WriteCheck::Invalid("x".into()).into_result(),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn validator_errors_become_invalid() {
        let sample = Sample {
            name: String::new(),
            age: 12,
        };
        let check = WriteCheck::from_validation(sample.validate());
        assert_eq!(
            check,
            WriteCheck::Invalid("age: range; name: must not be empty".into())
        );

        let sample = Sample {
            name: "ok".into(),
            age: 30,
        };
        assert!(WriteCheck::from_validation(sample.validate()).is_ok());
    }

    #[test]
    fn rule_results_fold_in() {
        assert!(WriteCheck::from_rule(Ok(())).is_ok());
        assert_eq!(
            WriteCheck::from_rule(Err(CoreError::Validation("nope".into()))),
            WriteCheck::Invalid("nope".into())
        );
    }
}
