use actix_web::{http::header, HttpRequest, HttpResponse};

/// Client-side navigation: `303 See Other` to `location`.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Unmatched paths go back to the home page.
pub async fn fallback(req: HttpRequest) -> HttpResponse {
    tracing::debug!(path = %req.path(), "unmatched path, redirecting home");
    see_other("/")
}

/// Accepts only same-site absolute paths as post-login targets.
pub fn safe_redirect_target(target: Option<&str>, default: &str) -> String {
    match target.map(str::trim) {
        Some(t) if t.starts_with('/') && !t.starts_with("//") && !t.contains('\\') => t.to_string(),
        _ => default.to_string(),
    }
}
