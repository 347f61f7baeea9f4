//! Handlers for the `/users` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use comanda_core::error::CoreError;
use comanda_core::projection::Projection;
use comanda_core::roles::{is_valid_role, VALID_ROLES};
use comanda_core::types::DbId;
use comanda_db::models::user::{CreateUser, UpdateUser, UpdateUserRole, User, USER_FIELDS};
use comanda_db::repositories::UserRepo;
use serde::Deserialize;
use serde_json::Value;

use crate::auth::password::{hash_new_password, PasswordError};
use crate::bulk::{parse_item, BulkCreateResponse, BulkDeleteResponse, BulkUpdateResponse};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::{FieldsParams, UserListParams};
use crate::response::{paginated, project};
use crate::state::AppState;

/// One item of `PUT /users/bulk/update`, addressed by id or by email.
#[derive(Debug, Deserialize)]
pub struct UserBulkUpdateItem {
    pub id: Option<DbId>,
    pub email: Option<String>,
    pub changes: UpdateUser,
}

/// Body of `DELETE /users/bulk/delete`.
#[derive(Debug, Default, Deserialize)]
pub struct UserBulkDeleteRequest {
    #[serde(default)]
    pub ids: Vec<DbId>,
    #[serde(default)]
    pub emails: Vec<String>,
}

async fn create_one(state: &AppState, input: &CreateUser) -> AppResult<User> {
    UserRepo::check_create(&state.pool, input).await?.into_result()?;

    let password_hash = input
        .password
        .as_deref()
        .map(hash_new_password)
        .transpose()
        .map_err(|e| match e {
            PasswordError::Rule(rule) => AppError::Core(rule),
            PasswordError::Hash(_) => AppError::InternalError(e.to_string()),
        })?;

    let user = UserRepo::create(&state.pool, input, password_hash.as_deref()).await?;
    tracing::info!(user_id = user.id, "User created");
    Ok(user)
}

async fn update_one(state: &AppState, id: DbId, input: &UpdateUser) -> AppResult<User> {
    UserRepo::check_update(&state.pool, id, input).await?.into_result()?;
    UserRepo::update(&state.pool, id, input)
        .await?
        .ok_or(AppError::not_found("User", id))
}

/// POST /api/v1/users
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = create_one(&state, &input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/v1/users/bulk
pub async fn bulk_create(
    State(state): State<AppState>,
    Json(items): Json<Vec<Value>>,
) -> (StatusCode, Json<BulkCreateResponse<User>>) {
    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let result = match parse_item::<CreateUser>(item) {
            Ok(input) => create_one(&state, &input).await,
            Err(e) => Err(e),
        };
        results.push(result);
    }
    BulkCreateResponse::collect(results).into_reply()
}

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<Value>> {
    let spec = params.to_spec()?;
    let page = UserRepo::list(&state.pool, &spec).await?;
    paginated("users", page, spec.projection.as_ref())
}

/// GET /api/v1/users/all
pub async fn list_all(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(UserRepo::list_all(&state.pool).await?))
}

/// GET /api/v1/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<FieldsParams>,
) -> AppResult<Json<Value>> {
    let projection = match params.fields.as_deref() {
        Some(raw) => Projection::parse(raw, &USER_FIELDS)?,
        None => None,
    };
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("User", id))?;
    Ok(Json(project(&user, projection.as_ref())?))
}

/// PUT /api/v1/users/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    Ok(Json(update_one(&state, id, &input).await?))
}

/// DELETE /api/v1/users/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if UserRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("User", id))
    }
}

/// PUT /api/v1/users/bulk/update
///
/// Items may name their target by `id` or by `email`; `id` wins when both
/// are present.
pub async fn bulk_update(
    State(state): State<AppState>,
    Json(items): Json<Vec<Value>>,
) -> Json<BulkUpdateResponse> {
    let mut response = BulkUpdateResponse::default();
    for (index, item) in items.into_iter().enumerate() {
        match bulk_update_item(&state, item).await {
            Ok((before, after)) => response.record_update(&before, &after),
            Err(err) => response.record_error(index, &err),
        }
    }
    Json(response)
}

/// Resolve and apply one bulk update item, returning the record before and after.
async fn bulk_update_item(state: &AppState, item: Value) -> AppResult<(User, User)> {
    let item: UserBulkUpdateItem = parse_item(item)?;
    let before = match (item.id, item.email.as_deref()) {
        (Some(id), _) => UserRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(AppError::not_found("User", id))?,
        (None, Some(email)) => UserRepo::find_by_email(&state.pool, email)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!("No user with email '{email}'")))
            })?,
        (None, None) => {
            return Err(AppError::Core(CoreError::Validation(
                "Each item needs an 'id' or an 'email'".into(),
            )))
        }
    };
    let after = update_one(state, before.id, &item.changes).await?;
    Ok((before, after))
}

/// DELETE /api/v1/users/bulk/delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(input): Json<UserBulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteResponse>> {
    if input.ids.is_empty() && input.emails.is_empty() {
        return Err(AppError::BadRequest("Provide 'ids' and/or 'emails'".into()));
    }
    let deleted_count = UserRepo::delete_many(&state.pool, &input.ids, &input.emails).await?;
    tracing::info!(deleted_count, "Users bulk deleted");
    Ok(Json(BulkDeleteResponse { deleted_count }))
}

/// PUT /api/v1/users/{id}/role
///
/// Admin only.
pub async fn set_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRole>,
) -> AppResult<Json<User>> {
    if !is_valid_role(&input.role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invalid role '{}'. Must be one of: {}",
            input.role,
            VALID_ROLES.join(", ")
        ))));
    }
    let user = UserRepo::set_role(&state.pool, id, &input.role)
        .await?
        .ok_or(AppError::not_found("User", id))?;
    tracing::info!(user_id = id, role = %input.role, by = admin.user_id, "User role changed");
    Ok(Json(user))
}
