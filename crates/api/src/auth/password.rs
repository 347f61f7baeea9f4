//! Argon2id password hashing for customer and admin logins.
//!
//! Hashes are PHC strings, so salt and parameters are stored with them.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use comanda_core::error::CoreError;
use comanda_core::user::validate_password;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// The password breaks the length rule.
    #[error(transparent)]
    Rule(#[from] CoreError),

    #[error("Password hashing error: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Check the password rule, then hash with a fresh salt.
pub fn hash_new_password(password: &str) -> Result<String, PasswordError> {
    validate_password(password)?;
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn hashed_password_verifies_only_itself() {
        let hash = hash_new_password("tacos-al-pastor").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("tacos-al-pastor", &hash).unwrap());
        assert!(!verify_password("tacos-de-birria", &hash).unwrap());
    }

    #[test]
    fn short_password_is_not_hashed() {
        assert_matches!(
            hash_new_password("1234567"),
            Err(PasswordError::Rule(CoreError::Validation(_)))
        );
    }

    #[test]
    fn same_password_gets_fresh_salt() {
        let a = hash_new_password("repeat-me-please").unwrap();
        let b = hash_new_password("repeat-me-please").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("whatever", "not-a-phc-string").is_err());
    }
}
