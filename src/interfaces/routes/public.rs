use actix_web::web;

use crate::handlers::{auth, blog, contact, home, portfolio};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(home::home)))
        .service(web::resource("/blog").route(web::get().to(blog::blog_index)))
        .service(web::resource("/blog/{slug}").route(web::get().to(blog::blog_post)))
        .service(web::resource("/portfolio").route(web::get().to(portfolio::portfolio_index)))
        .service(
            web::resource("/contact")
                .route(web::get().to(contact::contact_form))
                .route(web::post().to(contact::submit_contact)),
        )
        .service(
            web::resource("/login")
                .route(web::get().to(auth::login_page))
                .route(web::post().to(auth::login)),
        )
        .service(web::resource("/logout").route(web::post().to(auth::logout)));
}
