//! Repository for the `users` table.

use comanda_core::query_spec::QuerySpec;
use comanda_core::roles::ROLE_ADMIN;
use comanda_core::types::DbId;
use comanda_core::user::{self, normalize_email};
use comanda_core::write_check::WriteCheck;
use sqlx::PgPool;
use validator::Validate;

use crate::models::user::{CreateUser, UpdateUser, User};
use crate::query::{fetch_page, Page};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, longitude, latitude, registered_at, age, gender, \
                        role, password_hash, address, profile";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Field rules plus the email uniqueness probe for a new user.
    pub async fn check_create(pool: &PgPool, input: &CreateUser) -> Result<WriteCheck, sqlx::Error> {
        let check = WriteCheck::from_validation(input.validate())
            .and_then(|| WriteCheck::from_rule(user::validate_gender(&input.gender)))
            .and_then(|| WriteCheck::from_rule(user::validate_age(input.age)))
            .and_then(|| {
                WriteCheck::from_rule(user::validate_coordinates(input.longitude, input.latitude))
            })
            .and_then(|| match input.password.as_deref() {
                Some(password) => WriteCheck::from_rule(user::validate_password(password)),
                None => WriteCheck::Ok,
            });
        if !check.is_ok() {
            return Ok(check);
        }

        let email = normalize_email(&input.email);
        if Self::email_taken(pool, &email, None).await? {
            return Ok(WriteCheck::Conflict(format!("Email '{email}' is already registered")));
        }
        Ok(WriteCheck::Ok)
    }

    /// Field rules plus the email uniqueness probe for a patch of user `id`.
    pub async fn check_update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<WriteCheck, sqlx::Error> {
        let check = WriteCheck::from_validation(input.validate())
            .and_then(|| match &input.gender {
                Some(gender) => WriteCheck::from_rule(user::validate_gender(gender)),
                None => WriteCheck::Ok,
            })
            .and_then(|| match input.age {
                Some(age) => WriteCheck::from_rule(user::validate_age(age)),
                None => WriteCheck::Ok,
            })
            .and_then(|| {
                // A missing coordinate counts as 0.0 so only the supplied one can fail.
                let longitude = input.longitude.unwrap_or_default();
                let latitude = input.latitude.unwrap_or_default();
                WriteCheck::from_rule(user::validate_coordinates(longitude, latitude))
            });
        if !check.is_ok() {
            return Ok(check);
        }

        if let Some(email) = input.email.as_deref().map(normalize_email) {
            if Self::email_taken(pool, &email, Some(id)).await? {
                return Ok(WriteCheck::Conflict(format!("Email '{email}' is already registered")));
            }
        }
        Ok(WriteCheck::Ok)
    }

    /// Whether `email` (already normalised) belongs to a user other than `exclude_id`.
    pub async fn email_taken(
        pool: &PgPool,
        email: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Insert a new user, returning the created row.
    ///
    /// The email is stored normalised; `password_hash` is already hashed.
    pub async fn create(
        pool: &PgPool,
        input: &CreateUser,
        password_hash: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users
                (name, email, longitude, latitude, registered_at, age, gender,
                 password_hash, address, profile)
             VALUES ($1, $2, $3, $4, COALESCE($5, NOW()), $6, $7, $8, $9, COALESCE($10, '{{}}'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(normalize_email(&input.email))
            .bind(input.longitude)
            .bind(input.latitude)
            .bind(input.registered_at)
            .bind(input.age)
            .bind(&input.gender)
            .bind(password_hash)
            .bind(&input.address)
            .bind(&input.profile)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (normalised before comparison).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(normalize_email(email))
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Filtered, sorted, paginated listing.
    pub async fn list(pool: &PgPool, spec: &QuerySpec) -> Result<Page<User>, sqlx::Error> {
        fetch_page(pool, "users", COLUMNS, spec).await
    }

    /// Every user, newest registration first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY registered_at DESC, id DESC");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                longitude = COALESCE($4, longitude),
                latitude = COALESCE($5, latitude),
                age = COALESCE($6, age),
                gender = COALESCE($7, gender),
                address = COALESCE($8, address),
                profile = COALESCE($9, profile)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.email.as_deref().map(normalize_email))
            .bind(input.longitude)
            .bind(input.latitude)
            .bind(input.age)
            .bind(&input.gender)
            .bind(&input.address)
            .bind(&input.profile)
            .fetch_optional(pool)
            .await
    }

    /// Delete a user. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every user matching one of `ids` or `emails`.
    pub async fn delete_many(
        pool: &PgPool,
        ids: &[DbId],
        emails: &[String],
    ) -> Result<u64, sqlx::Error> {
        let emails: Vec<String> = emails.iter().map(|e| normalize_email(e)).collect();
        let result = sqlx::query("DELETE FROM users WHERE id = ANY($1) OR email = ANY($2)")
            .bind(ids)
            .bind(&emails)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Change a user's role. Returns `None` if the user does not exist.
    pub async fn set_role(pool: &PgPool, id: DbId, role: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET role = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    /// Make sure `email` exists as an admin with the given password hash.
    ///
    /// A missing account is created with placeholder profile fields; an
    /// existing one is promoted and gets the new hash.
    pub async fn ensure_admin(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, longitude, latitude, age, gender, role, password_hash)
             VALUES ('Administrator', $1, 0, 0, $2, $3, $4, $5)
             ON CONFLICT (email) DO UPDATE
                SET role = EXCLUDED.role, password_hash = EXCLUDED.password_hash
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(normalize_email(email))
            .bind(user::MIN_AGE)
            .bind(user::GENDER_FEMALE)
            .bind(ROLE_ADMIN)
            .bind(password_hash)
            .fetch_one(pool)
            .await
    }

    /// Replace the embedded `address` document.
    pub async fn set_address(
        pool: &PgPool,
        id: DbId,
        address: &serde_json::Value,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET address = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(address)
            .fetch_optional(pool)
            .await
    }

    /// Shallow-merge `updates` into the embedded `profile` document.
    ///
    /// Returns the number of rows actually changed: 0 when the user is
    /// missing or the merge is a no-op.
    pub async fn merge_profile(
        pool: &PgPool,
        id: DbId,
        updates: &serde_json::Value,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET profile = profile || $2
             WHERE id = $1 AND profile || $2 IS DISTINCT FROM profile",
        )
        .bind(id)
        .bind(updates)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
