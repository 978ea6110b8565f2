use chrono::Utc;
use mockall::{mock, predicate::*};
use uuid::Uuid;

use portfolio_site::entities::{
    category::Category,
    contact::{ContactDraft, ContactInsert, ContactStatus, ContactSubmission, StatusChangeRequest},
    post::{Post, PostDraft, PostInsert, PostUpdate},
    project::{Project, ProjectDraft, ProjectInsert, ProjectUpdate},
};
use portfolio_site::errors::AppError;
use portfolio_site::repositories::{
    category::CategoryRepository, contact::ContactRepository, post::PostRepository,
    project::ProjectRepository,
};
use portfolio_site::use_cases::{blog::BlogHandler, contact::ContactHandler, portfolio::PortfolioHandler};

const TOKEN: &str = "operator-token";

// === Mocks ===

mock! {
    pub PostRepo {}

    #[async_trait::async_trait]
    impl PostRepository for PostRepo {
        async fn list_published(&self, limit: Option<usize>) -> Result<Vec<Post>, AppError>;
        async fn get_published_by_slug(&self, slug: &str) -> Result<Post, AppError>;
        async fn list_all(&self, token: &str) -> Result<Vec<Post>, AppError>;
        async fn get_by_id(&self, id: i64, token: &str) -> Result<Post, AppError>;
        async fn create(&self, post: &PostInsert, token: &str) -> Result<Post, AppError>;
        async fn update(&self, id: i64, post: &PostUpdate, token: &str) -> Result<Post, AppError>;
        async fn set_published(&self, id: i64, published: bool, token: &str) -> Result<Post, AppError>;
        async fn delete(&self, id: i64, token: &str) -> Result<(), AppError>;
        async fn replace_categories(&self, post_id: i64, category_ids: &[Uuid], token: &str) -> Result<(), AppError>;
    }
}

mock! {
    pub CategoryRepo {}

    #[async_trait::async_trait]
    impl CategoryRepository for CategoryRepo {
        async fn list_all(&self) -> Result<Vec<Category>, AppError>;
    }
}

mock! {
    pub ProjectRepo {}

    #[async_trait::async_trait]
    impl ProjectRepository for ProjectRepo {
        async fn list_recent(&self, limit: Option<usize>) -> Result<Vec<Project>, AppError>;
        async fn get_by_id(&self, id: i64) -> Result<Project, AppError>;
        async fn create(&self, project: &ProjectInsert, token: &str) -> Result<Project, AppError>;
        async fn update(&self, id: i64, project: &ProjectUpdate, token: &str) -> Result<Project, AppError>;
        async fn delete(&self, id: i64, token: &str) -> Result<(), AppError>;
    }
}

mock! {
    pub ContactRepo {}

    #[async_trait::async_trait]
    impl ContactRepository for ContactRepo {
        async fn create(&self, contact: &ContactInsert) -> Result<(), AppError>;
        async fn list_all(&self, token: &str) -> Result<Vec<ContactSubmission>, AppError>;
        async fn get_by_id(&self, id: Uuid, token: &str) -> Result<ContactSubmission, AppError>;
        async fn set_status(&self, id: Uuid, status: ContactStatus, token: &str) -> Result<ContactSubmission, AppError>;
    }
}

// === Fixtures ===

fn post(id: i64, published: bool) -> Post {
    Post {
        id,
        title: "Inbox Zero".into(),
        slug: "inbox-zero".into(),
        content: "<p>Body</p>".into(),
        featured_image: None,
        published,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        categories: None,
    }
}

fn project(id: i64) -> Project {
    Project {
        id,
        title: "Support Desk".into(),
        slug: "support-desk".into(),
        description: "Ticket triage".into(),
        featured_image: None,
        live_url: None,
        github_url: None,
        technologies: vec!["Zendesk".into()],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn submission(id: Uuid, status: ContactStatus) -> ContactSubmission {
    ContactSubmission {
        id,
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        email: "jane@example.com".into(),
        phone: None,
        message: "Hello".into(),
        status,
        created_at: Utc::now(),
    }
}

fn blog(posts: MockPostRepo) -> BlogHandler<MockPostRepo, MockCategoryRepo> {
    BlogHandler::new(posts, MockCategoryRepo::new())
}

// === Blog ===

#[tokio::test]
async fn toggle_flips_the_current_flag() {
    let mut repo = MockPostRepo::new();
    repo.expect_get_by_id()
        .with(eq(7), eq(TOKEN))
        .times(1)
        .returning(|id, _| Ok(post(id, true)));
    repo.expect_set_published()
        .with(eq(7), eq(false), eq(TOKEN))
        .times(1)
        .returning(|id, published, _| Ok(post(id, published)));

    let toggled = blog(repo).toggle_published("7", TOKEN).await.unwrap();
    assert!(!toggled.published);
}

#[tokio::test]
async fn invalid_post_draft_never_reaches_the_repository() {
    let mut repo = MockPostRepo::new();
    repo.expect_create().never();
    repo.expect_replace_categories().never();

    let draft = PostDraft {
        title: "Untitled".into(),
        content: "   ".into(),
        ..Default::default()
    };
    let result = blog(repo).create_post(draft, TOKEN).await;

    assert!(matches!(result, Err(AppError::ValidationError(fields)) if fields[0].field == "content"));
}

#[tokio::test]
async fn create_links_categories_only_when_some_are_chosen() {
    let category = Uuid::new_v4();
    let mut repo = MockPostRepo::new();
    repo.expect_create()
        .withf(|insert, token| insert.slug == "inbox-zero" && token == TOKEN)
        .times(2)
        .returning(|_, _| Ok(post(3, false)));
    repo.expect_replace_categories()
        .withf(move |post_id, ids, _| *post_id == 3 && ids == [category])
        .times(1)
        .returning(|_, _, _| Ok(()));
    let handler = blog(repo);

    let plain = PostDraft {
        title: "Inbox Zero".into(),
        content: "<p>Body</p>".into(),
        ..Default::default()
    };
    handler.create_post(plain.clone(), TOKEN).await.unwrap();

    let tagged = PostDraft {
        category_ids: vec![category, category],
        ..plain
    };
    handler.create_post(tagged, TOKEN).await.unwrap();
}

#[tokio::test]
async fn create_discards_the_post_when_linking_fails() {
    let mut repo = MockPostRepo::new();
    repo.expect_create().times(1).returning(|_, _| Ok(post(3, false)));
    repo.expect_replace_categories()
        .times(1)
        .returning(|_, _, _| Err(AppError::InternalError("fk violation".into())));
    repo.expect_delete()
        .with(eq(3), eq(TOKEN))
        .times(1)
        .returning(|_, _| Ok(()));

    let draft = PostDraft {
        title: "Inbox Zero".into(),
        content: "<p>Body</p>".into(),
        category_ids: vec![Uuid::new_v4()],
        ..Default::default()
    };
    let result = blog(repo).create_post(draft, TOKEN).await;

    assert!(matches!(result, Err(AppError::InternalError(_))));
}

#[tokio::test]
async fn update_always_replaces_categories() {
    let mut repo = MockPostRepo::new();
    repo.expect_update()
        .withf(|id, update, _| *id == 3 && update.title == "Inbox Zero")
        .returning(|id, _, _| Ok(post(id, true)));
    repo.expect_replace_categories()
        .withf(|post_id, ids, _| *post_id == 3 && ids.is_empty())
        .times(1)
        .returning(|_, _, _| Ok(()));

    let draft = PostDraft {
        title: "Inbox Zero".into(),
        content: "<p>Body</p>".into(),
        ..Default::default()
    };
    blog(repo).update_post("3", draft, TOKEN).await.unwrap();
}

#[tokio::test]
async fn malformed_ids_are_rejected_before_any_call() {
    let mut repo = MockPostRepo::new();
    repo.expect_get_by_id().never();
    repo.expect_delete().never();
    let handler = blog(repo);

    for id in ["abc", "0", "-4", ""] {
        assert!(matches!(handler.toggle_published(id, TOKEN).await, Err(AppError::InvalidInput(_))), "{id}");
        assert!(matches!(handler.delete_post(id, TOKEN).await, Err(AppError::InvalidInput(_))), "{id}");
    }
}

#[tokio::test]
async fn recent_posts_pass_the_limit_through() {
    let mut repo = MockPostRepo::new();
    repo.expect_list_published()
        .with(eq(Some(3)))
        .returning(|_| Ok(vec![post(1, true)]));

    let posts = blog(repo).recent_posts(3).await.unwrap();
    assert_eq!(posts.len(), 1);
}

// === Portfolio ===

#[tokio::test]
async fn project_edit_draft_comes_from_the_stored_row() {
    let mut repo = MockProjectRepo::new();
    repo.expect_get_by_id().with(eq(9)).returning(|id| Ok(project(id)));

    let draft = PortfolioHandler::new(repo).project_draft("9").await.unwrap();
    assert_eq!(draft.slug, "support-desk");
    assert_eq!(draft.technologies, vec!["Zendesk"]);
}

#[tokio::test]
async fn invalid_project_draft_never_reaches_the_repository() {
    let mut repo = MockProjectRepo::new();
    repo.expect_create().never();

    let draft = ProjectDraft {
        title: "Support Desk".into(),
        description: "Ticket triage".into(),
        live_url: Some("not a url".into()),
        ..Default::default()
    };
    let result = PortfolioHandler::new(repo).create_project(draft, TOKEN).await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn project_conflicts_are_surfaced() {
    let mut repo = MockProjectRepo::new();
    repo.expect_create()
        .returning(|_, _| Err(AppError::Conflict("Duplicate value violates projects_slug_key".into())));

    let draft = ProjectDraft {
        title: "Support Desk".into(),
        description: "Ticket triage".into(),
        ..Default::default()
    };
    let result = PortfolioHandler::new(repo).create_project(draft, TOKEN).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

// === Contacts ===

#[tokio::test]
async fn status_change_without_a_target_advances_the_cycle() {
    let id = Uuid::new_v4();
    let mut repo = MockContactRepo::new();
    repo.expect_get_by_id()
        .with(eq(id), eq(TOKEN))
        .returning(|id, _| Ok(submission(id, ContactStatus::Contacted)));
    repo.expect_set_status()
        .with(eq(id), eq(ContactStatus::Resolved), eq(TOKEN))
        .times(1)
        .returning(|id, status, _| Ok(submission(id, status)));

    let updated = ContactHandler::new(repo)
        .change_status(&id.to_string(), StatusChangeRequest::default(), TOKEN)
        .await
        .unwrap();
    assert_eq!(updated.status, ContactStatus::Resolved);
}

#[tokio::test]
async fn explicit_status_skips_the_lookup() {
    let id = Uuid::new_v4();
    let mut repo = MockContactRepo::new();
    repo.expect_get_by_id().never();
    repo.expect_set_status()
        .with(eq(id), eq(ContactStatus::New), eq(TOKEN))
        .returning(|id, status, _| Ok(submission(id, status)));

    let request = StatusChangeRequest {
        status: Some(ContactStatus::New),
    };
    ContactHandler::new(repo)
        .change_status(&id.to_string(), request, TOKEN)
        .await
        .unwrap();
}

#[tokio::test]
async fn incomplete_contact_draft_is_not_stored() {
    let mut repo = MockContactRepo::new();
    repo.expect_create().never();

    let draft = ContactDraft {
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        email: "not-an-email".into(),
        phone: None,
        message: "Hello".into(),
    };
    let result = ContactHandler::new(repo).submit(draft).await;

    assert!(matches!(result, Err(AppError::ValidationError(fields)) if fields[0].field == "email"));
}

#[tokio::test]
async fn valid_contact_draft_is_stored_as_new() {
    let mut repo = MockContactRepo::new();
    repo.expect_create()
        .withf(|insert| insert.status == ContactStatus::New && insert.first_name == "Jane")
        .times(1)
        .returning(|_| Ok(()));

    let draft = ContactDraft {
        first_name: " Jane ".into(),
        last_name: "Doe".into(),
        email: "jane@example.com".into(),
        phone: Some("".into()),
        message: "Hello".into(),
    };
    ContactHandler::new(repo).submit(draft).await.unwrap();
}
