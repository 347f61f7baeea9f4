//! Request and response shapes shared by the bulk endpoints.
//!
//! Bulk create and bulk update run every item through the same path as the
//! single-record operation and collect failures per item instead of
//! aborting the batch.

use axum::http::StatusCode;
use axum::Json;
use comanda_core::error::CoreError;
use comanda_core::types::DbId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// One failed item of a bulk request.
#[derive(Debug, Clone, Serialize)]
pub struct BulkItemError {
    /// Position of the item in the request array.
    pub index: usize,
    pub code: &'static str,
    pub error: String,
}

impl BulkItemError {
    pub fn new(index: usize, err: &AppError) -> Self {
        let (_, code, error) = err.classify();
        Self { index, code, error }
    }
}

/// Deserialize one raw bulk item so a malformed entry fails on its own.
pub fn parse_item<T: DeserializeOwned>(value: serde_json::Value) -> AppResult<T> {
    serde_json::from_value(value).map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))
}

/// Response of `POST /bulk`.
#[derive(Debug, Serialize)]
pub struct BulkCreateResponse<T: Serialize> {
    pub inserted: Vec<T>,
    pub inserted_count: usize,
    pub errors: Vec<BulkItemError>,
}

impl<T: Serialize> BulkCreateResponse<T> {
    /// Split per-item outcomes into successes and indexed errors.
    pub fn collect(results: Vec<AppResult<T>>) -> Self {
        let mut inserted = Vec::new();
        let mut errors = Vec::new();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(record) => inserted.push(record),
                Err(err) => errors.push(BulkItemError::new(index, &err)),
            }
        }
        Self {
            inserted_count: inserted.len(),
            inserted,
            errors,
        }
    }

    /// 201 unless every item failed, in which case 400.
    pub fn into_reply(self) -> (StatusCode, Json<Self>) {
        let status = if self.inserted.is_empty() && !self.errors.is_empty() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::CREATED
        };
        (status, Json(self))
    }
}

/// One item of `PUT /bulk/update`.
#[derive(Debug, Deserialize)]
pub struct BulkUpdateItem<T> {
    pub id: DbId,
    pub changes: T,
}

/// Response of `PUT /bulk/update`.
#[derive(Debug, Default, Serialize)]
pub struct BulkUpdateResponse {
    /// Items whose target record exists.
    pub matched_count: u64,
    /// Matched items whose stored record actually changed.
    pub modified_count: u64,
    pub errors: Vec<BulkItemError>,
}

impl BulkUpdateResponse {
    pub fn record_error(&mut self, index: usize, err: &AppError) {
        self.errors.push(BulkItemError::new(index, err));
    }

    /// Count a matched item, and a modification when the serialized record
    /// differs before and after the write.
    pub fn record_update<T: Serialize>(&mut self, before: &T, after: &T) {
        self.matched_count += 1;
        if serde_json::to_value(before).ok() != serde_json::to_value(after).ok() {
            self.modified_count += 1;
        }
    }
}

/// Body of `DELETE /bulk/delete`.
#[derive(Debug, Default, Deserialize)]
pub struct BulkDeleteRequest {
    #[serde(default)]
    pub ids: Vec<DbId>,
}

/// Response of `DELETE /bulk/delete`.
#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub deleted_count: u64,
}
