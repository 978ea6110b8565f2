use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::{
    backend::{query::{Query, Table, POST_CATEGORIES}, store::SharedStore},
    entities::{
        category::PostCategory,
        post::{Post, PostInsert, PostUpdate},
    },
    errors::AppError,
    repositories::backend_repo::{decode_rows, first_row, to_row, BackendPostRepo},
};

#[async_trait]
pub trait PostRepository: Sync + Send {
    async fn list_published(&self, limit: Option<usize>) -> Result<Vec<Post>, AppError>;
    async fn get_published_by_slug(&self, slug: &str) -> Result<Post, AppError>;
    async fn list_all(&self, token: &str) -> Result<Vec<Post>, AppError>;
    async fn get_by_id(&self, id: i64, token: &str) -> Result<Post, AppError>;
    async fn create(&self, post: &PostInsert, token: &str) -> Result<Post, AppError>;
    async fn update(&self, id: i64, post: &PostUpdate, token: &str) -> Result<Post, AppError>;
    async fn set_published(&self, id: i64, published: bool, token: &str) -> Result<Post, AppError>;
    async fn delete(&self, id: i64, token: &str) -> Result<(), AppError>;
    async fn replace_categories(&self, post_id: i64, category_ids: &[Uuid], token: &str) -> Result<(), AppError>;
}

impl BackendPostRepo {
    pub fn new(store: SharedStore) -> Self {
        BackendPostRepo { store }
    }
}

#[async_trait]
impl PostRepository for BackendPostRepo {
    async fn list_published(&self, limit: Option<usize>) -> Result<Vec<Post>, AppError> {
        let mut query = Query::from(Table::Posts)
            .expand(POST_CATEGORIES)
            .eq("published", true)
            .newest_first();
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        decode_rows(self.store.select(&query).await?)
    }

    async fn get_published_by_slug(&self, slug: &str) -> Result<Post, AppError> {
        let query = Query::from(Table::Posts)
            .expand(POST_CATEGORIES)
            .eq("slug", slug)
            .eq("published", true)
            .limit(1);
        first_row(self.store.select(&query).await?, "Post")
    }

    async fn list_all(&self, token: &str) -> Result<Vec<Post>, AppError> {
        let query = Query::from(Table::Posts)
            .newest_first()
            .bearer(Some(token));
        decode_rows(self.store.select(&query).await?)
    }

    async fn get_by_id(&self, id: i64, token: &str) -> Result<Post, AppError> {
        let query = Query::from(Table::Posts)
            .expand(POST_CATEGORIES)
            .eq("id", id)
            .bearer(Some(token));
        first_row(self.store.select(&query).await?, "Post")
    }

    async fn create(&self, post: &PostInsert, token: &str) -> Result<Post, AppError> {
        let query = Query::from(Table::Posts).bearer(Some(token));
        first_row(self.store.insert(&query, vec![to_row(post)?]).await?, "Post")
    }

    async fn update(&self, id: i64, post: &PostUpdate, token: &str) -> Result<Post, AppError> {
        let query = Query::from(Table::Posts).eq("id", id).bearer(Some(token));
        first_row(self.store.update(&query, to_row(post)?).await?, "Post")
    }

    async fn set_published(&self, id: i64, published: bool, token: &str) -> Result<Post, AppError> {
        let query = Query::from(Table::Posts).eq("id", id).bearer(Some(token));
        let patch = json!({ "published": published, "updated_at": chrono::Utc::now() });
        first_row(self.store.update(&query, patch).await?, "Post")
    }

    async fn delete(&self, id: i64, token: &str) -> Result<(), AppError> {
        let query = Query::from(Table::Posts).eq("id", id).bearer(Some(token));
        let removed = self.store.delete(&query).await?;
        if removed.is_empty() {
            return Err(AppError::NotFound("Post".into()));
        }
        Ok(())
    }

    async fn replace_categories(&self, post_id: i64, category_ids: &[Uuid], token: &str) -> Result<(), AppError> {
        let links = Query::from(Table::PostCategories).bearer(Some(token));
        self.store
            .delete(&links.clone().eq("post_id", post_id))
            .await?;

        if category_ids.is_empty() {
            return Ok(());
        }
        let rows = category_ids
            .iter()
            .map(|category_id| to_row(&PostCategory { post_id, category_id: *category_id }))
            .collect::<Result<Vec<_>, _>>()?;
        self.store.insert(&links, rows).await?;
        Ok(())
    }
}
