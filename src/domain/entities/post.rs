use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    entities::{
        category::Category,
        validation::{
            normalize_optional, resolve_slug, single_field_error, validate_not_blank,
            validate_slug, validate_url, MAX_SLUG_LENGTH, MIN_SLUG_LENGTH,
        },
    },
    utils::html::{plain_text_excerpt, sanitize_post_html},
};

// ───── Constants ──────────────────────────────────────────────────────
const MAX_TITLE_LENGTH: u64 = 200;
pub const EXCERPT_LENGTH: usize = 150;

// ───── Backend Rows ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(default)]
    pub featured_image: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PostInsert {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PostUpdate {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub published: bool,
    pub updated_at: DateTime<Utc>,
}

// ───── Form Drafts ───────────────────────────────────────────────────

/// Editable fields of a post as held by the create/edit forms.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct PostDraft {
    #[validate(
        length(max = MAX_TITLE_LENGTH, message = "Title is too long"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,

    pub slug: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub content: String,

    #[validate(custom(function = "validate_url"))]
    pub featured_image: Option<String>,

    pub published: bool,

    pub category_ids: Vec<Uuid>,
}

impl PostDraft {
    /// Trims the draft and drops blank optional fields.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.featured_image = normalize_optional(self.featured_image);
        self.category_ids.sort();
        self.category_ids.dedup();
        self
    }

    /// Validates the draft and resolves the slug it will be stored under.
    pub fn checked_slug(&self) -> Result<String, ValidationErrors> {
        self.validate()?;

        let slug = resolve_slug(&self.slug, &self.title);
        let len = slug.len() as u64;
        if len < MIN_SLUG_LENGTH || len > MAX_SLUG_LENGTH {
            return Err(single_field_error("slug", "slug_length", "Slug length is out of range; please provide a custom slug"));
        }
        validate_slug(&slug).map_err(|e| {
            let mut errors = ValidationErrors::new();
            errors.add("slug", e);
            errors
        })?;

        Ok(slug)
    }
}

impl From<&Post> for PostDraft {
    fn from(post: &Post) -> Self {
        PostDraft {
            title: post.title.clone(),
            slug: post.slug.clone(),
            content: post.content.clone(),
            featured_image: post.featured_image.clone(),
            published: post.published,
            category_ids: post
                .categories
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|c| c.id)
                .collect(),
        }
    }
}

impl TryFrom<PostDraft> for PostInsert {
    type Error = ValidationErrors;

    fn try_from(draft: PostDraft) -> Result<Self, Self::Error> {
        let draft = draft.normalized();
        let slug = draft.checked_slug()?;
        let now = Utc::now();

        Ok(PostInsert {
            title: draft.title,
            slug,
            content: draft.content,
            featured_image: draft.featured_image,
            published: draft.published,
            created_at: now,
            updated_at: now,
        })
    }
}

impl TryFrom<PostDraft> for PostUpdate {
    type Error = ValidationErrors;

    fn try_from(draft: PostDraft) -> Result<Self, Self::Error> {
        let draft = draft.normalized();
        let slug = draft.checked_slug()?;

        Ok(PostUpdate {
            title: draft.title,
            slug,
            content: draft.content,
            featured_image: draft.featured_image,
            published: draft.published,
            updated_at: Utc::now(),
        })
    }
}

// ───── View Models ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PostCard {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub featured_image: Option<String>,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content_html: String,
    pub featured_image: Option<String>,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AdminPostRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub published: bool,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub edit_url: String,
}

impl Post {
    pub fn to_card(&self) -> PostCard {
        PostCard {
            id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            excerpt: plain_text_excerpt(&self.content, EXCERPT_LENGTH),
            featured_image: self.featured_image.clone(),
            categories: self.categories.clone().unwrap_or_default(),
            created_at: self.created_at,
            url: format!("/blog/{}", self.slug),
        }
    }

    pub fn to_detail(&self) -> PostDetail {
        PostDetail {
            id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            content_html: sanitize_post_html(&self.content),
            featured_image: self.featured_image.clone(),
            categories: self.categories.clone().unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn to_admin_row(&self) -> AdminPostRow {
        AdminPostRow {
            id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            published: self.published,
            status: if self.published { "Published" } else { "Draft" },
            created_at: self.created_at,
            edit_url: format!("/admin/blog/edit/{}", self.id),
        }
    }
}
