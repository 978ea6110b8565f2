use actix_web::web;

use crate::{
    handlers::{admin, admin_blog, admin_contacts, admin_portfolio, navigation},
    middlewares::route_guard::RouteGuard,
};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(RouteGuard)
            .service(web::resource("").route(web::get().to(admin::dashboard)))
            .service(web::resource("/blog").route(web::get().to(admin_blog::list_posts)))
            .service(
                web::resource("/blog/new")
                    .route(web::get().to(admin_blog::new_post_form))
                    .route(web::post().to(admin_blog::create_post)),
            )
            .service(
                web::resource("/blog/edit/{id}")
                    .route(web::get().to(admin_blog::edit_post_form))
                    .route(web::post().to(admin_blog::update_post)),
            )
            .service(
                web::resource("/blog/{id}/toggle-published")
                    .route(web::post().to(admin_blog::toggle_published)),
            )
            .service(web::resource("/blog/{id}").route(web::delete().to(admin_blog::delete_post)))
            .service(web::resource("/portfolio").route(web::get().to(admin_portfolio::list_projects)))
            .service(
                web::resource("/portfolio/new")
                    .route(web::get().to(admin_portfolio::new_project_form))
                    .route(web::post().to(admin_portfolio::create_project)),
            )
            .service(
                web::resource("/portfolio/edit/{id}")
                    .route(web::get().to(admin_portfolio::edit_project_form))
                    .route(web::post().to(admin_portfolio::update_project)),
            )
            .service(
                web::resource("/portfolio/{id}").route(web::delete().to(admin_portfolio::delete_project)),
            )
            .service(web::resource("/contacts").route(web::get().to(admin_contacts::list_contacts)))
            .service(
                web::resource("/contacts/{id}/status").route(web::post().to(admin_contacts::change_status)),
            )
            .default_service(web::to(navigation::fallback)),
    );
}
