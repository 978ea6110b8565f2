use actix_web::HttpResponse;
use serde::Serialize;
use tracing::instrument;

use crate::use_cases::extractors::Operator;

#[derive(Serialize)]
struct AdminLink {
    label: &'static str,
    href: &'static str,
}

#[derive(Serialize)]
struct DashboardView {
    email: String,
    links: [AdminLink; 3],
}

#[instrument]
pub async fn dashboard(operator: Operator) -> HttpResponse {
    HttpResponse::Ok().json(DashboardView {
        email: operator.identity.email,
        links: [
            AdminLink { label: "Blog Posts", href: "/admin/blog" },
            AdminLink { label: "Portfolio", href: "/admin/portfolio" },
            AdminLink { label: "Contacts", href: "/admin/contacts" },
        ],
    })
}
