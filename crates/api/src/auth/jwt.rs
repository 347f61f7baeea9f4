//! Access tokens for the ordering API.
//!
//! Tokens are HS256 JWTs issued by `comanda-api` after a password login.
//! A token only authenticates if its issuer matches and its role is one the
//! API knows; there is no refresh flow, clients log in again on expiry.

use comanda_core::roles;
use comanda_core::types::DbId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;

/// `iss` claim written into and required from every token.
pub const TOKEN_ISSUER: &str = "comanda-api";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    /// `admin` or `user`.
    pub role: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    /// Per-token id, logged on login.
    pub jti: String,
}

/// A freshly signed token and its lifetime in seconds.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_in: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Token carries unknown role '{0}'")]
    UnknownRole(String),
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss"]);
    validation
}

/// Sign a token for `user_id` acting as `role`.
pub fn issue_token(config: &JwtConfig, user_id: DbId, role: &str) -> Result<IssuedToken, TokenError> {
    if !roles::is_valid_role(role) {
        return Err(TokenError::UnknownRole(role.to_string()));
    }

    let now = chrono::Utc::now().timestamp();
    let expires_in = config.access_token_expiry_mins * 60;
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        iss: TOKEN_ISSUER.to_string(),
        exp: now + expires_in,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;
    Ok(IssuedToken {
        token,
        jti: claims.jti,
        expires_in,
    })
}

/// Check signature, expiry, issuer and role, returning the claims.
pub fn verify_token(config: &JwtConfig, token: &str) -> Result<Claims, TokenError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation(),
    )?;
    if !roles::is_valid_role(&data.claims.role) {
        return Err(TokenError::UnknownRole(data.claims.role));
    }
    Ok(data.claims)
}
