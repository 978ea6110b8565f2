use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::{
    entities::project::Project,
    errors::AppError,
    handlers::views::ListView,
    use_cases::extractors::BrowserContext,
    AppState,
};

#[instrument(skip(state))]
pub async fn portfolio_index(ctx: BrowserContext, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let ticket = state.view_scopes.begin(ctx.0, "portfolio");
    let projects = ticket.run(state.portfolio_handler.projects(None)).await?;

    Ok(HttpResponse::Ok().json(ListView::load(projects, "projects", Project::clone)))
}
