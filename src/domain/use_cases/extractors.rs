use std::fmt;

use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use crate::{
    constants::CONTEXT_COOKIE,
    entities::identity::{Identity, Session},
    errors::{AppError, AuthError},
};

/// Id of the visitor's browser context, assigned by the browser-context
/// middleware or read back from its cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserContext(pub Uuid);

impl FromRequest for BrowserContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        if let Some(ctx) = req.extensions().get::<BrowserContext>() {
            return ready(Ok(*ctx));
        }
        let from_cookie = req
            .cookie(CONTEXT_COOKIE)
            .and_then(|c| Uuid::parse_str(c.value()).ok())
            .map(BrowserContext);

        match from_cookie {
            Some(ctx) => ready(Ok(ctx)),
            None => ready(Err(AppError::InvalidInput("Missing browser context".into()).into())),
        }
    }
}

/// The signed-in operator of a guarded request.
///
/// Inserted by the route guard; handlers outside `/admin` cannot extract it.
#[derive(Clone)]
pub struct Operator {
    pub identity: Identity,
    pub access_token: String,
}

impl From<Session> for Operator {
    fn from(session: Session) -> Self {
        Operator {
            identity: session.identity,
            access_token: session.access_token,
        }
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("identity", &self.identity)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl FromRequest for Operator {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<Operator>() {
            Some(operator) => ready(Ok(operator.clone())),
            None => ready(Err(AuthError::MissingCredentials.into())),
        }
    }
}
