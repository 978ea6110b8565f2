use actix_web::web;

use crate::handlers::json_error::JsonError;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        tracing::warn!(error = %err, "rejected JSON payload");
        JsonError::from(err).into()
    }));
}
