use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{backend::store::SharedStore, errors::{AppError, BackendError}};

#[derive(Clone)]
pub struct BackendPostRepo {
    pub store: SharedStore,
}

#[derive(Clone)]
pub struct BackendCategoryRepo {
    pub store: SharedStore,
}

#[derive(Clone)]
pub struct BackendProjectRepo {
    pub store: SharedStore,
}

#[derive(Clone)]
pub struct BackendContactRepo {
    pub store: SharedStore,
}

pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, AppError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(BackendError::from))
        .collect::<Result<Vec<T>, BackendError>>()
        .map_err(AppError::from)
}

/// First affected row, or `NotFound` when the filter (or a row-level rule)
/// matched nothing.
pub(crate) fn first_row<T: DeserializeOwned>(rows: Vec<Value>, what: &str) -> Result<T, AppError> {
    decode_rows(rows)?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(what.to_string()))
}

pub(crate) fn to_row<T: serde::Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value)
        .map_err(|e| AppError::InternalError(format!("Failed to encode row: {}", e)))
}
