use async_trait::async_trait;

use crate::{
    backend::{query::{Query, Table}, store::SharedStore},
    entities::project::{Project, ProjectInsert, ProjectUpdate},
    errors::AppError,
    repositories::backend_repo::{decode_rows, first_row, to_row, BackendProjectRepo},
};

#[async_trait]
pub trait ProjectRepository: Sync + Send {
    async fn list_recent(&self, limit: Option<usize>) -> Result<Vec<Project>, AppError>;
    async fn get_by_id(&self, id: i64) -> Result<Project, AppError>;
    async fn create(&self, project: &ProjectInsert, token: &str) -> Result<Project, AppError>;
    async fn update(&self, id: i64, project: &ProjectUpdate, token: &str) -> Result<Project, AppError>;
    async fn delete(&self, id: i64, token: &str) -> Result<(), AppError>;
}

impl BackendProjectRepo {
    pub fn new(store: SharedStore) -> Self {
        BackendProjectRepo { store }
    }
}

#[async_trait]
impl ProjectRepository for BackendProjectRepo {
    async fn list_recent(&self, limit: Option<usize>) -> Result<Vec<Project>, AppError> {
        let mut query = Query::from(Table::Projects).newest_first();
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        decode_rows(self.store.select(&query).await?)
    }

    async fn get_by_id(&self, id: i64) -> Result<Project, AppError> {
        let query = Query::from(Table::Projects).eq("id", id).limit(1);
        first_row(self.store.select(&query).await?, "Project")
    }

    async fn create(&self, project: &ProjectInsert, token: &str) -> Result<Project, AppError> {
        let query = Query::from(Table::Projects).bearer(Some(token));
        first_row(self.store.insert(&query, vec![to_row(project)?]).await?, "Project")
    }

    async fn update(&self, id: i64, project: &ProjectUpdate, token: &str) -> Result<Project, AppError> {
        let query = Query::from(Table::Projects).eq("id", id).bearer(Some(token));
        first_row(self.store.update(&query, to_row(project)?).await?, "Project")
    }

    async fn delete(&self, id: i64, token: &str) -> Result<(), AppError> {
        let query = Query::from(Table::Projects).eq("id", id).bearer(Some(token));
        if self.store.delete(&query).await?.is_empty() {
            return Err(AppError::NotFound("Project".into()));
        }
        Ok(())
    }
}
