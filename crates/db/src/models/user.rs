//! User entity model and DTOs.

use comanda_core::query_spec::EntityFields;
use comanda_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub longitude: f64,
    pub latitude: f64,
    pub registered_at: Timestamp,
    pub age: i32,
    pub gender: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub address: Option<serde_json::Value>,
    pub profile: serde_json::Value,
}

pub static USER_FIELDS: EntityFields = EntityFields {
    entity: "user",
    fields: &[
        "id",
        "name",
        "email",
        "longitude",
        "latitude",
        "registered_at",
        "age",
        "gender",
        "role",
        "address",
        "profile",
    ],
    default_sort: "registered_at",
};

/// DTO for creating a user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub longitude: f64,
    pub latitude: f64,
    pub registered_at: Option<Timestamp>,
    pub age: i32,
    pub gender: String,
    /// Plain-text password; only its hash is stored.
    pub password: Option<String>,
    pub address: Option<serde_json::Value>,
    pub profile: Option<serde_json::Value>,
}

/// DTO for updating a user. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub address: Option<serde_json::Value>,
    pub profile: Option<serde_json::Value>,
}

/// DTO for `PUT /users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRole {
    pub role: String,
}
