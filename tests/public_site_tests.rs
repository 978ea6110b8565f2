mod test_utils;

use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;

fn slugs(view: &Value) -> Vec<String> {
    view["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["slug"].as_str().unwrap().to_string())
        .collect()
}

#[actix_rt::test]
async fn unpublished_posts_stay_private() {
    let app = TestApp::spawn().await;
    app.login_as_operator().await;
    app.create_post("Live Post", "live-post", true).await;
    app.create_post("Secret Draft", "secret-draft", false).await;

    let visitor = browser();
    let index: Value = visitor.get(app.url("/blog")).send().await.unwrap().json().await.unwrap();
    assert_eq!(index["state"], "ready");
    assert_eq!(slugs(&index), vec!["live-post"]);

    let detail = visitor.get(app.url("/blog/secret-draft")).send().await.unwrap();
    assert_eq!(detail.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&detail), "/blog");

    // the operator's own session does not make drafts public either
    let own = app.get("/blog/secret-draft").await;
    assert_eq!(own.status(), StatusCode::SEE_OTHER);
}

#[actix_rt::test]
async fn published_post_detail_is_sanitized() {
    let app = TestApp::spawn().await;
    app.login_as_operator().await;
    app.post_json(
        "/admin/blog/new",
        &json!({
            "title": "Tips for Busy Founders",
            "content": "<p>Hello</p><script>alert(1)</script>",
            "published": true
        }),
    )
    .await;

    let response = app.get("/blog/tips-for-busy-founders").await;
    assert_eq!(response.status(), StatusCode::OK);
    let post = body(response).await;
    assert_eq!(post["title"], "Tips for Busy Founders");
    assert_eq!(post["content_html"], "<p>Hello</p>");
}

#[actix_rt::test]
async fn missing_post_redirects_to_index() {
    let app = TestApp::spawn().await;

    let response = app.get("/blog/does-not-exist").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/blog");
}

#[actix_rt::test]
async fn blog_index_shows_excerpts_and_categories() {
    let app = TestApp::spawn().await;
    let category = app.seed_category("Productivity", "productivity");
    app.login_as_operator().await;
    app.post_json(
        "/admin/blog/new",
        &json!({
            "title": "Long Read",
            "content": format!("<p>{}</p>", "word ".repeat(60)),
            "published": true,
            "category_ids": [category]
        }),
    )
    .await;

    let index = body(app.get("/blog").await).await;
    let card = &index["items"][0];
    assert!(card["excerpt"].as_str().unwrap().ends_with("..."));
    assert!(!card["excerpt"].as_str().unwrap().contains('<'));
    assert_eq!(card["url"], "/blog/long-read");
    assert_eq!(card["categories"][0]["name"], "Productivity");
}

#[actix_rt::test]
async fn home_shows_recent_posts_and_projects() {
    let app = TestApp::spawn().await;
    app.login_as_operator().await;
    for i in 0..4 {
        app.create_post(&format!("Post {}", i), &format!("post-{}", i), true).await;
    }
    for i in 0..6 {
        app.create_project(&format!("Project {}", i)).await;
    }

    let home = body(app.get("/").await).await;
    assert_eq!(home["recent_posts"]["items"].as_array().unwrap().len(), 3);
    assert_eq!(home["recent_projects"]["items"].as_array().unwrap().len(), 5);
    assert_eq!(home["recent_posts"]["items"][0]["slug"], "post-3");
    assert_eq!(home["recent_projects"]["items"][0]["slug"], "project-5");
}

#[actix_rt::test]
async fn new_project_is_listed_once_and_first() {
    let app = TestApp::spawn().await;
    app.login_as_operator().await;
    app.create_project("Older Project").await;

    let response = app.create_project("Client Portal").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/portfolio");

    let portfolio = body(app.get("/portfolio").await).await;
    let listed = slugs(&portfolio);
    assert_eq!(listed.first().map(String::as_str), Some("client-portal"));
    assert_eq!(listed.iter().filter(|s| *s == "client-portal").count(), 1);
    assert_eq!(portfolio["items"][0]["technologies"], json!(["Rust", "Actix"]));
}

#[actix_rt::test]
async fn complete_contact_submission_is_stored_as_new() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/contact",
            &json!({
                "first_name": "Jane",
                "last_name": "Doe",
                "email": "jane@example.com",
                "phone": "+1 555 010 2030",
                "message": "I need help with my inbox."
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let view = body(response).await;
    assert_eq!(view["state"], "submitted");
    assert_eq!(view["draft"]["email"], "");

    app.login_as_operator().await;
    let contacts = body(app.get("/admin/contacts").await).await;
    assert_eq!(contacts["items"][0]["status"], "new");
    assert_eq!(contacts["items"][0]["name"], "Jane Doe");
}

#[actix_rt::test]
async fn incomplete_contact_submission_never_reaches_the_backend() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/contact",
            &json!({
                "first_name": "Jane",
                "last_name": "",
                "email": "jane@example.com",
                "message": "Hello"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let view = body(response).await;
    assert_eq!(view["state"], "error");
    assert_eq!(view["draft"]["first_name"], "Jane");
    assert_eq!(view["field_errors"][0]["field"], "last_name");

    app.login_as_operator().await;
    let contacts = body(app.get("/admin/contacts").await).await;
    assert!(contacts["items"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn contact_submission_without_a_field_is_a_form_error() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/contact",
            &json!({
                "first_name": "Jane",
                "email": "jane@example.com",
                "message": "Hello"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let view = body(response).await;
    assert_eq!(view["state"], "error");
    assert_eq!(view["draft"]["first_name"], "Jane");
    assert_eq!(view["draft"]["last_name"], "");
    assert_eq!(view["field_errors"][0]["field"], "last_name");
}

#[actix_rt::test]
async fn unknown_paths_redirect_home() {
    let app = TestApp::spawn().await;

    let response = app.get("/no/such/page").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[actix_rt::test]
async fn first_visit_assigns_a_browser_context_cookie() {
    let app = TestApp::spawn().await;

    let response = reqwest::Client::new().get(app.url("/blog")).send().await.unwrap();

    let cookie = response
        .cookies()
        .find(|c| c.name() == "portfolio_ctx")
        .expect("context cookie");
    assert!(uuid::Uuid::parse_str(cookie.value()).is_ok());
    assert!(cookie.http_only());
}
