use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    entities::{
        category::Category,
        post::{AdminPostRow, Post, PostDraft},
    },
    errors::AppError,
    handlers::{
        navigation::see_other,
        views::{FormView, ListView},
    },
    use_cases::extractors::{BrowserContext, Operator},
    AppState,
};

const LIST_PATH: &str = "/admin/blog";
const LIST_SCOPE: &str = "admin/blog";

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// Every post, drafts included, newest first.
#[instrument(skip(state))]
pub async fn list_posts(
    ctx: BrowserContext,
    operator: Operator,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(refetch(ctx, &operator, &state, None).await?))
}

async fn refetch(
    ctx: BrowserContext,
    operator: &Operator,
    state: &AppState,
    error: Option<String>,
) -> Result<ListView<AdminPostRow>, AppError> {
    let ticket = state.view_scopes.begin(ctx.0, LIST_SCOPE);
    let posts = ticket
        .run(state.blog_handler.admin_posts(&operator.access_token))
        .await?;
    Ok(ListView::load(posts, "admin posts", Post::to_admin_row).with_error(error))
}

async fn categories(state: &AppState) -> Vec<Category> {
    state.blog_handler.categories().await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to load categories");
        Vec::new()
    })
}

#[instrument(skip(state))]
pub async fn new_post_form(_operator: Operator, state: web::Data<AppState>) -> HttpResponse {
    let view = FormView::idle(PostDraft::default()).with_categories(categories(&state).await);
    HttpResponse::Ok().json(view)
}

#[instrument(skip(state, draft))]
pub async fn create_post(
    operator: Operator,
    state: web::Data<AppState>,
    draft: web::Json<PostDraft>,
) -> HttpResponse {
    let draft = draft.into_inner();

    match state
        .blog_handler
        .create_post(draft.clone(), &operator.access_token)
        .await
    {
        Ok(_) => see_other(LIST_PATH),
        Err(e) => form_failure(&state, draft, e).await,
    }
}

/// Loads a post into the edit form; anything but success returns to the list.
#[instrument(skip(state))]
pub async fn edit_post_form(
    operator: Operator,
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> HttpResponse {
    match state.blog_handler.post_draft(&id, &operator.access_token).await {
        Ok(draft) => {
            let view = FormView::idle(draft).with_categories(categories(&state).await);
            HttpResponse::Ok().json(view)
        }
        Err(e) => {
            tracing::error!(error = %e, post_id = %id, "failed to load post for editing");
            see_other(LIST_PATH)
        }
    }
}

#[instrument(skip(state, draft))]
pub async fn update_post(
    operator: Operator,
    id: web::Path<String>,
    state: web::Data<AppState>,
    draft: web::Json<PostDraft>,
) -> HttpResponse {
    let draft = draft.into_inner();

    match state
        .blog_handler
        .update_post(&id, draft.clone(), &operator.access_token)
        .await
    {
        Ok(_) => see_other(LIST_PATH),
        Err(e) => form_failure(&state, draft, e).await,
    }
}

/// Flips the published flag, then answers with a fresh list.
#[instrument(skip(state))]
pub async fn toggle_published(
    ctx: BrowserContext,
    operator: Operator,
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let error = match state
        .blog_handler
        .toggle_published(&id, &operator.access_token)
        .await
    {
        Ok(post) => {
            tracing::info!(post_id = post.id, published = post.published, "publish flag toggled");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, post_id = %id, "failed to toggle publish flag");
            Some(e.to_string())
        }
    };

    Ok(HttpResponse::Ok().json(refetch(ctx, &operator, &state, error).await?))
}

#[instrument(skip(state))]
pub async fn delete_post(
    ctx: BrowserContext,
    operator: Operator,
    id: web::Path<String>,
    query: web::Query<DeleteQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if !query.confirm {
        return Err(AppError::InvalidInput("Deleting a post requires confirm=true".into()));
    }

    let error = match state.blog_handler.delete_post(&id, &operator.access_token).await {
        Ok(()) => None,
        Err(e) => {
            tracing::error!(error = %e, post_id = %id, "failed to delete post");
            Some(e.to_string())
        }
    };

    Ok(HttpResponse::Ok().json(refetch(ctx, &operator, &state, error).await?))
}

async fn form_failure(state: &AppState, draft: PostDraft, error: AppError) -> HttpResponse {
    if !matches!(error, AppError::ValidationError(_)) {
        tracing::error!(error = %error, "failed to save post");
    }
    let view = FormView::failed(draft, &error).with_categories(categories(state).await);
    match error {
        AppError::Conflict(_) => HttpResponse::Conflict().json(view),
        _ => HttpResponse::UnprocessableEntity().json(view),
    }
}
