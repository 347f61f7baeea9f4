//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::Json;
use comanda_core::error::CoreError;
use comanda_db::models::user::User;
use comanda_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::issue_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: User,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Accounts created without a password
/// cannot log in.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let Some(hash) = user.password_hash.as_deref() else {
        return Err(invalid_credentials());
    };

    let password_valid = verify_password(&input.password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Rejected login with wrong password");
        return Err(invalid_credentials());
    }

    let issued = issue_token(&state.config.jwt, user.id, &user.role)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, role = %user.role, jti = %issued.jti, "User logged in");

    Ok(Json(AuthResponse {
        access_token: issued.token,
        expires_in: issued.expires_in,
        user,
    }))
}
