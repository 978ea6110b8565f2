use std::{
    rc::Rc,
    task::{Context, Poll},
};

use actix_web::{
    cookie::{Cookie, SameSite},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use uuid::Uuid;

use crate::{constants::CONTEXT_COOKIE, use_cases::extractors::BrowserContext};

/// Identifies the visitor's browser context by cookie, assigning a fresh one
/// on first visit.
pub struct BrowserContextMiddleware;

impl<S, B> Transform<S, ServiceRequest> for BrowserContextMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = BrowserContextService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(BrowserContextService {
            service: Rc::new(service),
        })
    }
}

pub struct BrowserContextService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for BrowserContextService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let existing = req
                .cookie(CONTEXT_COOKIE)
                .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());
            let context = existing.unwrap_or_else(Uuid::new_v4);
            req.extensions_mut().insert(BrowserContext(context));

            let mut res = service.call(req).await?;

            if existing.is_none() {
                let cookie = Cookie::build(CONTEXT_COOKIE, context.to_string())
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .finish();
                res.response_mut()
                    .add_cookie(&cookie)
                    .map_err(actix_web::error::ErrorInternalServerError)?;
                tracing::debug!(%context, "assigned browser context");
            }
            Ok(res)
        })
    }
}
