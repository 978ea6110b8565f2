use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use validator::{ValidationError, ValidationErrors};

pub const MIN_SLUG_LENGTH: u64 = 1;
pub const MAX_SLUG_LENGTH: u64 = 120;

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9 ()\-.]{6,24}$").expect("phone pattern is valid")
});

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Err(new_validation_error("slug_empty", "Slug cannot be empty"));
    }
    if !slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(new_validation_error("slug_invalid_chars", "Slug must contain only lowercase letters, digits, or hyphens"));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(new_validation_error("slug_edge_hyphen", "Slug must not start or end with a hyphen"));
    }
    if slug.contains("--") {
        return Err(new_validation_error("slug_double_hyphen", "Slug must not contain consecutive hyphens"));
    }
    Ok(())
}

pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    match url::Url::parse(url) {
        Ok(parsed) => {
            if parsed.scheme() == "http" || parsed.scheme() == "https" {
                Ok(())
            } else {
                Err(new_validation_error("invalid_url_scheme", "URL must start with http:// or https://"))
            }
        }
        Err(_) => Err(new_validation_error("invalid_url", "Invalid URL format")),
    }
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(new_validation_error("blank", "This field is required"));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if !PHONE_PATTERN.is_match(phone) {
        return Err(new_validation_error("invalid_phone", "Invalid phone number"));
    }
    Ok(())
}

pub fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}

pub fn single_field_error(field: &'static str, code: &'static str, msg: &'static str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, new_validation_error(code, msg));
    errors
}

/// Blank optional text collapses to `None`, anything else is trimmed.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolves the slug a draft will be stored under: an explicit slug wins,
/// a blank one is derived from the title.
pub fn resolve_slug(slug: &str, title: &str) -> String {
    let trimmed = slug.trim();
    if trimmed.is_empty() {
        slug::slugify(title)
    } else {
        trimmed.to_string()
    }
}
