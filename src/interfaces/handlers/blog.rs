use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::{
    entities::post::Post,
    errors::AppError,
    handlers::{navigation::see_other, views::ListView},
    use_cases::extractors::BrowserContext,
    AppState,
};

#[instrument(skip(state))]
pub async fn blog_index(ctx: BrowserContext, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let ticket = state.view_scopes.begin(ctx.0, "blog");
    let posts = ticket.run(state.blog_handler.published_posts()).await?;

    Ok(HttpResponse::Ok().json(ListView::load(posts, "blog posts", Post::to_card)))
}

/// A published post by slug. Missing, unpublished or failed loads all send
/// the viewer back to the index.
#[instrument(skip(state))]
pub async fn blog_post(
    ctx: BrowserContext,
    slug: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let ticket = state.view_scopes.begin(ctx.0, "blog/post");

    match ticket.run(state.blog_handler.published_post(&slug)).await? {
        Ok(post) => Ok(HttpResponse::Ok().json(post.to_detail())),
        Err(AppError::NotFound(_)) => {
            tracing::info!(slug = %slug, "no published post with this slug");
            Ok(see_other("/blog"))
        }
        Err(e) => {
            tracing::error!(error = %e, slug = %slug, "failed to load post");
            Ok(see_other("/blog"))
        }
    }
}
