use actix_web::web;

use crate::handlers::navigation::fallback;

mod admin;
mod json_error;
mod public;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(json_error::config_routes);
    cfg.configure(public::config_routes);
    cfg.configure(admin::config_routes);
    cfg.default_service(web::to(fallback));
}
