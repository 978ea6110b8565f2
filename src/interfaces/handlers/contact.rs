use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::instrument;

use crate::{
    entities::contact::ContactDraft,
    errors::AppError,
    handlers::views::FormView,
    AppState,
};

#[derive(Serialize)]
struct SubmittedView {
    state: &'static str,
    message: &'static str,
    draft: ContactDraft,
    send_another: &'static str,
}

pub async fn contact_form() -> HttpResponse {
    HttpResponse::Ok().json(FormView::idle(ContactDraft::default()))
}

/// Public contact form submission. Drafts failing validation are answered
/// without touching the backend.
#[instrument(skip(state, draft))]
pub async fn submit_contact(
    state: web::Data<AppState>,
    draft: web::Json<ContactDraft>,
) -> HttpResponse {
    let draft = draft.into_inner();

    match state.contact_handler.submit(draft.clone()).await {
        Ok(()) => HttpResponse::Created().json(SubmittedView {
            state: "submitted",
            message: "Thank you for your message! We'll get back to you soon.",
            draft: ContactDraft::default(),
            send_another: "/contact",
        }),
        Err(e) => {
            if !matches!(e, AppError::ValidationError(_)) {
                tracing::error!(error = %e, "failed to store contact submission");
            }
            HttpResponse::UnprocessableEntity().json(FormView::failed(draft, &e))
        }
    }
}
