use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::{
    entities::project::{AdminProjectRow, Project, ProjectDraft},
    errors::AppError,
    handlers::{
        admin_blog::DeleteQuery,
        navigation::see_other,
        views::{FormView, ListView},
    },
    use_cases::extractors::{BrowserContext, Operator},
    AppState,
};

const LIST_PATH: &str = "/admin/portfolio";
const LIST_SCOPE: &str = "admin/portfolio";

async fn refetch(
    ctx: BrowserContext,
    state: &AppState,
    error: Option<String>,
) -> Result<ListView<AdminProjectRow>, AppError> {
    let ticket = state.view_scopes.begin(ctx.0, LIST_SCOPE);
    let projects = ticket.run(state.portfolio_handler.projects(None)).await?;
    Ok(ListView::load(projects, "admin projects", Project::to_admin_row).with_error(error))
}

#[instrument(skip(state))]
pub async fn list_projects(
    ctx: BrowserContext,
    _operator: Operator,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(refetch(ctx, &state, None).await?))
}

pub async fn new_project_form(_operator: Operator) -> HttpResponse {
    HttpResponse::Ok().json(FormView::idle(ProjectDraft::default()))
}

#[instrument(skip(state, draft))]
pub async fn create_project(
    operator: Operator,
    state: web::Data<AppState>,
    draft: web::Json<ProjectDraft>,
) -> HttpResponse {
    let draft = draft.into_inner();

    match state
        .portfolio_handler
        .create_project(draft.clone(), &operator.access_token)
        .await
    {
        Ok(_) => see_other(LIST_PATH),
        Err(e) => form_failure(draft, e),
    }
}

#[instrument(skip(state))]
pub async fn edit_project_form(
    _operator: Operator,
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> HttpResponse {
    match state.portfolio_handler.project_draft(&id).await {
        Ok(draft) => HttpResponse::Ok().json(FormView::idle(draft)),
        Err(e) => {
            tracing::error!(error = %e, project_id = %id, "failed to load project for editing");
            see_other(LIST_PATH)
        }
    }
}

#[instrument(skip(state, draft))]
pub async fn update_project(
    operator: Operator,
    id: web::Path<String>,
    state: web::Data<AppState>,
    draft: web::Json<ProjectDraft>,
) -> HttpResponse {
    let draft = draft.into_inner();

    match state
        .portfolio_handler
        .update_project(&id, draft.clone(), &operator.access_token)
        .await
    {
        Ok(_) => see_other(LIST_PATH),
        Err(e) => form_failure(draft, e),
    }
}

#[instrument(skip(state))]
pub async fn delete_project(
    ctx: BrowserContext,
    operator: Operator,
    id: web::Path<String>,
    query: web::Query<DeleteQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if !query.confirm {
        return Err(AppError::InvalidInput("Deleting a project requires confirm=true".into()));
    }

    let error = match state
        .portfolio_handler
        .delete_project(&id, &operator.access_token)
        .await
    {
        Ok(()) => None,
        Err(e) => {
            tracing::error!(error = %e, project_id = %id, "failed to delete project");
            Some(e.to_string())
        }
    };

    Ok(HttpResponse::Ok().json(refetch(ctx, &state, error).await?))
}

fn form_failure(draft: ProjectDraft, error: AppError) -> HttpResponse {
    if !matches!(error, AppError::ValidationError(_)) {
        tracing::error!(error = %error, "failed to save project");
    }
    let view = FormView::failed(draft, &error);
    match error {
        AppError::Conflict(_) => HttpResponse::Conflict().json(view),
        _ => HttpResponse::UnprocessableEntity().json(view),
    }
}
