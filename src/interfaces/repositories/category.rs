use async_trait::async_trait;

use crate::{
    backend::{query::{Query, Table}, store::SharedStore},
    entities::category::Category,
    errors::AppError,
    repositories::backend_repo::{decode_rows, BackendCategoryRepo},
};

#[async_trait]
pub trait CategoryRepository: Sync + Send {
    async fn list_all(&self) -> Result<Vec<Category>, AppError>;
}

impl BackendCategoryRepo {
    pub fn new(store: SharedStore) -> Self {
        BackendCategoryRepo { store }
    }
}

#[async_trait]
impl CategoryRepository for BackendCategoryRepo {
    async fn list_all(&self) -> Result<Vec<Category>, AppError> {
        let query = Query::from(Table::Categories).order("name", true);
        decode_rows(self.store.select(&query).await?)
    }
}
