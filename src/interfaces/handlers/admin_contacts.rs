use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::{
    entities::contact::{AdminContactRow, ContactSubmission, StatusChangeRequest},
    errors::AppError,
    handlers::views::ListView,
    use_cases::extractors::{BrowserContext, Operator},
    AppState,
};

const LIST_SCOPE: &str = "admin/contacts";

async fn refetch(
    ctx: BrowserContext,
    operator: &Operator,
    state: &AppState,
    error: Option<String>,
) -> Result<ListView<AdminContactRow>, AppError> {
    let ticket = state.view_scopes.begin(ctx.0, LIST_SCOPE);
    let submissions = ticket
        .run(state.contact_handler.submissions(&operator.access_token))
        .await?;
    Ok(ListView::load(submissions, "contact submissions", ContactSubmission::to_admin_row).with_error(error))
}

#[instrument(skip(state))]
pub async fn list_contacts(
    ctx: BrowserContext,
    operator: Operator,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(refetch(ctx, &operator, &state, None).await?))
}

/// Sets a submission's status (the next one in the cycle when the body
/// names none), then answers with a fresh list.
#[instrument(skip(state, body))]
pub async fn change_status(
    ctx: BrowserContext,
    operator: Operator,
    id: web::Path<String>,
    state: web::Data<AppState>,
    body: Option<web::Json<StatusChangeRequest>>,
) -> Result<HttpResponse, AppError> {
    let request = body.map(web::Json::into_inner).unwrap_or_default();

    let error = match state
        .contact_handler
        .change_status(&id, request, &operator.access_token)
        .await
    {
        Ok(contact) => {
            tracing::info!(contact_id = %contact.id, status = contact.status.as_str(), "contact status changed");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, contact_id = %id, "failed to change contact status");
            Some(e.to_string())
        }
    };

    Ok(HttpResponse::Ok().json(refetch(ctx, &operator, &state, error).await?))
}
