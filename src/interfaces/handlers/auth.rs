use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    constants::{DEFAULT_ADMIN_LANDING, LOGIN_PATH, SIGN_IN_FAILED},
    entities::identity::SignInRequest,
    handlers::navigation::{safe_redirect_target, see_other},
    use_cases::extractors::BrowserContext,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub redirect: Option<String>,
}

#[derive(Serialize)]
struct LoginView {
    redirect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

/// The login page. A viewer who is already signed in goes straight on.
#[instrument(skip(state))]
pub async fn login_page(
    ctx: BrowserContext,
    query: web::Query<LoginQuery>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let target = safe_redirect_target(query.redirect.as_deref(), DEFAULT_ADMIN_LANDING);

    if state.sessions.identity(ctx.0).is_some() {
        return see_other(&target);
    }
    HttpResponse::Ok().json(LoginView { redirect: target, error: None })
}

/// Signs the browser context in. Any failure, malformed input included,
/// leaves the viewer on the login page with the same message.
#[instrument(skip(state, credentials))]
pub async fn login(
    ctx: BrowserContext,
    query: web::Query<LoginQuery>,
    state: web::Data<AppState>,
    credentials: web::Json<SignInRequest>,
) -> HttpResponse {
    let credentials = credentials.into_inner();
    let requested = credentials.redirect.as_deref().or(query.redirect.as_deref());
    let target = safe_redirect_target(requested, DEFAULT_ADMIN_LANDING);

    let failed = || {
        HttpResponse::Unauthorized().json(LoginView {
            redirect: target.clone(),
            error: Some(SIGN_IN_FAILED),
        })
    };

    if let Err(e) = credentials.validate() {
        tracing::warn!(error = %e, "rejected malformed sign-in");
        return failed();
    }

    match state
        .sessions
        .context(ctx.0)
        .sign_in(&credentials.email, &credentials.password)
        .await
    {
        Ok(identity) => {
            tracing::info!(email = %identity.email, "operator signed in");
            see_other(&target)
        }
        Err(_) => failed(),
    }
}

#[instrument(skip(state))]
pub async fn logout(ctx: BrowserContext, state: web::Data<AppState>) -> HttpResponse {
    if let Some(context) = state.sessions.get(ctx.0) {
        context.sign_out().await;
    }
    state.view_scopes.close(ctx.0);
    see_other(LOGIN_PATH)
}
