use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::validation::{normalize_optional, validate_not_blank, validate_phone},
    utils::html::truncate_chars,
};

pub const MESSAGE_PREVIEW_LENGTH: usize = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    New,
    Contacted,
    Resolved,
}

impl ContactStatus {
    /// The status the admin list offers next: new → contacted → resolved → new.
    pub fn next(self) -> Self {
        match self {
            ContactStatus::New => ContactStatus::Contacted,
            ContactStatus::Contacted => ContactStatus::Resolved,
            ContactStatus::Resolved => ContactStatus::New,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Contacted => "contacted",
            ContactStatus::Resolved => "resolved",
        }
    }

    fn action_label(self) -> &'static str {
        match self {
            ContactStatus::New => "Mark as Contacted",
            ContactStatus::Contacted => "Mark as Resolved",
            ContactStatus::Resolved => "Reopen",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct ContactDraft {
    #[validate(
        length(max = 100, message = "First name is too long"),
        custom(function = "validate_not_blank")
    )]
    pub first_name: String,

    #[validate(
        length(max = 100, message = "Last name is too long"),
        custom(function = "validate_not_blank")
    )]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    #[validate(
        length(max = 5000, message = "Message is too long"),
        custom(function = "validate_not_blank")
    )]
    pub message: String,
}

impl ContactDraft {
    pub fn normalized(mut self) -> Self {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self.phone = normalize_optional(self.phone);
        self
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContactInsert {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ContactDraft> for ContactInsert {
    type Error = validator::ValidationErrors;

    fn try_from(draft: ContactDraft) -> Result<Self, Self::Error> {
        let draft = draft.normalized();
        draft.validate()?;

        Ok(ContactInsert {
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone: draft.phone,
            message: draft.message,
            status: ContactStatus::New,
            created_at: Utc::now(),
        })
    }
}

/// Body of a status change; without an explicit status the next one in the
/// cycle is applied.
#[derive(Debug, Default, Deserialize)]
pub struct StatusChangeRequest {
    #[serde(default)]
    pub status: Option<ContactStatus>,
}

#[derive(Debug, Serialize)]
pub struct AdminContactRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message_preview: String,
    pub status: ContactStatus,
    pub next_status: ContactStatus,
    pub next_action: &'static str,
    pub created_at: DateTime<Utc>,
}

impl ContactSubmission {
    pub fn to_admin_row(&self) -> AdminContactRow {
        AdminContactRow {
            id: self.id,
            name: format!("{} {}", self.first_name, self.last_name),
            email: self.email.clone(),
            phone: self.phone.clone(),
            message_preview: truncate_chars(&self.message, MESSAGE_PREVIEW_LENGTH),
            status: self.status,
            next_status: self.status.next(),
            next_action: self.status.action_label(),
            created_at: self.created_at,
        }
    }
}
