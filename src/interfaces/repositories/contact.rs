use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::{
    backend::{query::{Query, Table}, store::SharedStore},
    entities::contact::{ContactInsert, ContactStatus, ContactSubmission},
    errors::AppError,
    repositories::backend_repo::{decode_rows, first_row, to_row, BackendContactRepo},
};

#[async_trait]
pub trait ContactRepository: Sync + Send {
    /// Anonymous insert; visitors cannot read submissions back.
    async fn create(&self, contact: &ContactInsert) -> Result<(), AppError>;
    async fn list_all(&self, token: &str) -> Result<Vec<ContactSubmission>, AppError>;
    async fn get_by_id(&self, id: Uuid, token: &str) -> Result<ContactSubmission, AppError>;
    async fn set_status(&self, id: Uuid, status: ContactStatus, token: &str) -> Result<ContactSubmission, AppError>;
}

impl BackendContactRepo {
    pub fn new(store: SharedStore) -> Self {
        BackendContactRepo { store }
    }
}

#[async_trait]
impl ContactRepository for BackendContactRepo {
    async fn create(&self, contact: &ContactInsert) -> Result<(), AppError> {
        let query = Query::from(Table::Contacts).without_returning();
        self.store.insert(&query, vec![to_row(contact)?]).await?;
        Ok(())
    }

    async fn list_all(&self, token: &str) -> Result<Vec<ContactSubmission>, AppError> {
        let query = Query::from(Table::Contacts).newest_first().bearer(Some(token));
        decode_rows(self.store.select(&query).await?)
    }

    async fn get_by_id(&self, id: Uuid, token: &str) -> Result<ContactSubmission, AppError> {
        let query = Query::from(Table::Contacts)
            .eq("id", id.to_string())
            .bearer(Some(token));
        first_row(self.store.select(&query).await?, "Contact submission")
    }

    async fn set_status(&self, id: Uuid, status: ContactStatus, token: &str) -> Result<ContactSubmission, AppError> {
        let query = Query::from(Table::Contacts)
            .eq("id", id.to_string())
            .bearer(Some(token));
        let patch = json!({ "status": status });
        first_row(self.store.update(&query, patch).await?, "Contact submission")
    }
}
