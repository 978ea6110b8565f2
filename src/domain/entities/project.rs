use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::entities::validation::{
    new_validation_error, normalize_optional, resolve_slug, single_field_error,
    validate_not_blank, validate_slug, validate_url, MAX_SLUG_LENGTH, MIN_SLUG_LENGTH,
};

const MAX_TITLE_LENGTH: u64 = 200;
const MAX_TECHNOLOGIES: usize = 30;
const MAX_TECHNOLOGY_LENGTH: usize = 40;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProjectInsert {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub featured_image: Option<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub technologies: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProjectUpdate {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub featured_image: Option<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub technologies: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a portfolio project.
///
/// `technologies` accepts either a JSON array or the comma-separated string
/// typed into the form; entries are trimmed and blanks dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct ProjectDraft {
    #[validate(
        length(max = MAX_TITLE_LENGTH, message = "Title is too long"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,

    pub slug: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub description: String,

    #[validate(custom(function = "validate_url"))]
    pub featured_image: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub live_url: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub github_url: Option<String>,

    #[serde(default, deserialize_with = "technologies_from_input")]
    #[validate(custom(function = "validate_technologies"))]
    pub technologies: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TechnologiesInput {
    List(Vec<String>),
    Csv(String),
}

fn technologies_from_input<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match TechnologiesInput::deserialize(deserializer)? {
        TechnologiesInput::List(items) => items,
        TechnologiesInput::Csv(text) => text.split(',').map(str::to_string).collect(),
    };
    Ok(clean_technologies(raw))
}

pub fn clean_technologies(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn validate_technologies(technologies: &[String]) -> Result<(), ValidationError> {
    if technologies.len() > MAX_TECHNOLOGIES {
        return Err(new_validation_error("too_many_technologies", "Too many technologies listed"));
    }
    if technologies.iter().any(|t| t.chars().count() > MAX_TECHNOLOGY_LENGTH) {
        return Err(new_validation_error("technology_length", "Technology names must be at most 40 characters"));
    }
    Ok(())
}

impl ProjectDraft {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.featured_image = normalize_optional(self.featured_image);
        self.live_url = normalize_optional(self.live_url);
        self.github_url = normalize_optional(self.github_url);
        self.technologies = clean_technologies(self.technologies);
        self
    }

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

impl From<&Project> for ProjectDraft {
    fn from(project: &Project) -> Self {
        ProjectDraft {
            title: project.title.clone(),
            slug: project.slug.clone(),
            description: project.description.clone(),
            featured_image: project.featured_image.clone(),
            live_url: project.live_url.clone(),
            github_url: project.github_url.clone(),
            technologies: project.technologies.clone(),
        }
    }
}

impl TryFrom<ProjectDraft> for ProjectInsert {
    type Error = ValidationErrors;

    fn try_from(draft: ProjectDraft) -> Result<Self, Self::Error> {
        let draft = draft.normalized();
        let slug = draft.checked_slug()?;
        let now = Utc::now();

        Ok(ProjectInsert {
            title: draft.title,
            slug,
            description: draft.description,
            featured_image: draft.featured_image,
            live_url: draft.live_url,
            github_url: draft.github_url,
            technologies: draft.technologies,
            created_at: now,
            updated_at: now,
        })
    }
}

impl TryFrom<ProjectDraft> for ProjectUpdate {
    type Error = ValidationErrors;

    fn try_from(draft: ProjectDraft) -> Result<Self, Self::Error> {
        let draft = draft.normalized();
        let slug = draft.checked_slug()?;

        Ok(ProjectUpdate {
            title: draft.title,
            slug,
            description: draft.description,
            featured_image: draft.featured_image,
            live_url: draft.live_url,
            github_url: draft.github_url,
            technologies: draft.technologies,
            updated_at: Utc::now(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AdminProjectRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub technologies: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub edit_url: String,
}

impl Project {
    pub fn to_admin_row(&self) -> AdminProjectRow {
        AdminProjectRow {
            id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            technologies: self.technologies.clone(),
            created_at: self.created_at,
            edit_url: format!("/admin/portfolio/edit/{}", self.id),
        }
    }
}
