use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::{backend::query::Query, errors::BackendError};

/// Table-level access to the remote row store.
///
/// Mutations return the affected rows as the backend represents them, or
/// nothing when the query was built with `without_returning`.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, BackendError>;
    async fn insert(&self, query: &Query, rows: Vec<Value>) -> Result<Vec<Value>, BackendError>;
    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, BackendError>;
    async fn delete(&self, query: &Query) -> Result<Vec<Value>, BackendError>;
}

pub type SharedStore = Arc<dyn TableStore>;
