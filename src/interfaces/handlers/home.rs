use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::instrument;

use crate::{
    constants::{HOME_RECENT_POSTS, HOME_RECENT_PROJECTS},
    entities::{
        post::{Post, PostCard},
        project::Project,
    },
    errors::AppError,
    handlers::views::ListView,
    use_cases::extractors::BrowserContext,
    AppState,
};

#[derive(Serialize)]
struct HomeView {
    recent_posts: ListView<PostCard>,
    recent_projects: ListView<Project>,
}

#[instrument(skip(state))]
pub async fn home(ctx: BrowserContext, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let ticket = state.view_scopes.begin(ctx.0, "home");
    let (posts, projects) = ticket
        .run(async {
            futures::join!(
                state.blog_handler.recent_posts(HOME_RECENT_POSTS),
                state.portfolio_handler.projects(Some(HOME_RECENT_PROJECTS)),
            )
        })
        .await?;

    Ok(HttpResponse::Ok().json(HomeView {
        recent_posts: ListView::load(posts, "recent posts", Post::to_card),
        recent_projects: ListView::load(projects, "recent projects", Project::clone),
    }))
}
