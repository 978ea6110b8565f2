use crate::{
    entities::{
        category::Category,
        post::{Post, PostDraft, PostInsert, PostUpdate},
    },
    errors::AppError,
    repositories::{category::CategoryRepository, post::PostRepository},
    utils::valid_id::valid_row_id,
};

pub struct BlogHandler<P, C>
where
    P: PostRepository,
    C: CategoryRepository,
{
    pub post_repo: P,
    pub category_repo: C,
}

impl<P, C> BlogHandler<P, C>
where
    P: PostRepository,
    C: CategoryRepository,
{
    pub fn new(post_repo: P, category_repo: C) -> Self {
        BlogHandler { post_repo, category_repo }
    }

    /// Most recent published posts, newest first.
    pub async fn recent_posts(&self, limit: usize) -> Result<Vec<Post>, AppError> {
        self.post_repo.list_published(Some(limit)).await
    }

    pub async fn published_posts(&self) -> Result<Vec<Post>, AppError> {
        self.post_repo.list_published(None).await
    }

    /// A single post by slug; drafts are never returned.
    pub async fn published_post(&self, slug: &str) -> Result<Post, AppError> {
        self.post_repo.get_published_by_slug(slug.trim()).await
    }

    pub async fn admin_posts(&self, token: &str) -> Result<Vec<Post>, AppError> {
        self.post_repo.list_all(token).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, AppError> {
        self.category_repo.list_all().await
    }

    /// Loads an existing post into an editable draft.
    pub async fn post_draft(&self, id: &str, token: &str) -> Result<PostDraft, AppError> {
        let id = valid_row_id(id)?;
        let post = self.post_repo.get_by_id(id, token).await?;
        Ok(PostDraft::from(&post))
    }

    pub async fn create_post(&self, draft: PostDraft, token: &str) -> Result<Post, AppError> {
        let draft = draft.normalized();
        let insert = PostInsert::try_from(draft.clone())?;

        let post = self.post_repo.create(&insert, token).await?;
        if !draft.category_ids.is_empty() {
            if let Err(e) = self
                .post_repo
                .replace_categories(post.id, &draft.category_ids, token)
                .await
            {
                // a retry of the same draft must not conflict with this row
                self.discard_post(post.id, token).await;
                return Err(e);
            }
        }

        tracing::info!(post_id = post.id, slug = %post.slug, "post created");
        Ok(post)
    }

    pub async fn update_post(&self, id: &str, draft: PostDraft, token: &str) -> Result<Post, AppError> {
        let id = valid_row_id(id)?;
        let draft = draft.normalized();
        let update = PostUpdate::try_from(draft.clone())?;

        let post = self.post_repo.update(id, &update, token).await?;
        self.post_repo
            .replace_categories(id, &draft.category_ids, token)
            .await?;

        tracing::info!(post_id = id, slug = %post.slug, "post updated");
        Ok(post)
    }

    async fn discard_post(&self, id: i64, token: &str) {
        match self.post_repo.delete(id, token).await {
            Ok(()) => tracing::warn!(post_id = id, "discarded post whose categories could not be linked"),
            Err(e) => tracing::error!(error = %e, post_id = id, "failed to discard half-created post"),
        }
    }

    /// Flips the published flag of a post.
    pub async fn toggle_published(&self, id: &str, token: &str) -> Result<Post, AppError> {
        let id = valid_row_id(id)?;
        let current = self.post_repo.get_by_id(id, token).await?;
        self.post_repo
            .set_published(id, !current.published, token)
            .await
    }

    pub async fn delete_post(&self, id: &str, token: &str) -> Result<(), AppError> {
        let id = valid_row_id(id)?;
        self.post_repo.delete(id, token).await.map_err(|e| match e {
            AppError::NotFound(_) => AppError::NotFound("Blog post".to_string()),
            _ => e,
        })
    }
}
