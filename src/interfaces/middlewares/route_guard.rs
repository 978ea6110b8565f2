use std::{
    rc::Rc,
    task::{Context, Poll},
};

use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};

use crate::{
    constants::LOGIN_PATH,
    errors::AppError,
    handlers::navigation::see_other,
    use_cases::extractors::{BrowserContext, Operator},
    AppState,
};

/// Sends anonymous viewers to the login page, remembering where they were
/// headed. Signed-in requests carry the [`Operator`] to the handler.
pub struct RouteGuard;

impl<S> Transform<S, ServiceRequest> for RouteGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RouteGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RouteGuardService {
            service: Rc::new(service),
        })
    }
}

pub struct RouteGuardService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for RouteGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .cloned()
                .ok_or_else(|| {
                    tracing::error!("AppState missing in route guard");
                    AppError::InternalError("Application state unavailable".into())
                })?;

            let context = req.extensions().get::<BrowserContext>().copied();
            let session = context.and_then(|ctx| state.sessions.session(ctx.0));

            match session {
                Some(session) => {
                    req.extensions_mut().insert(Operator::from(session));
                    service.call(req).await
                }
                None => {
                    let target = login_redirect(req.path(), req.query_string());
                    tracing::debug!(path = %req.path(), "anonymous viewer sent to login");
                    Ok(req.into_response(see_other(&target)))
                }
            }
        })
    }
}

fn login_redirect(path: &str, query: &str) -> String {
    let original = if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    };
    format!("{}?redirect={}", LOGIN_PATH, urlencoding::encode(&original))
}
