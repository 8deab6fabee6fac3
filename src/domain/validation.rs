//! Field-level validation for user-submitted drafts.
//!
//! Every entity that accepts user input has an explicit draft struct and a
//! validation function returning the list of failing fields. An empty list
//! means the draft is acceptable.

use std::fmt;

use serde::Serialize;

use crate::domain::slug::{MAX_SLUG_LEN, is_valid_slug};

pub const MAX_USERNAME_LEN: usize = 150;
pub const MAX_GROUP_TITLE_LEN: usize = 200;
pub const MAX_IMAGE_REF_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Post contents as submitted for creation or editing.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub text: String,
    /// Slug of the group to file the post under.
    pub group: Option<String>,
    /// Opaque reference to an already stored image.
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CommentDraft {
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct GroupDraft {
    pub title: String,
    /// Explicit slug; derived from the title when absent.
    pub slug: Option<String>,
    pub description: String,
}

pub fn validate_post_draft(draft: &PostDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if draft.text.trim().is_empty() {
        errors.push(FieldError::new("text", "must not be blank"));
    }

    if draft.group.as_deref().is_some_and(|group| group.trim().is_empty()) {
        errors.push(FieldError::new("group", "must not be blank when present"));
    }

    if let Some(image) = draft.image.as_deref() {
        if image.trim().is_empty() {
            errors.push(FieldError::new("image", "must not be blank when present"));
        } else if image.len() > MAX_IMAGE_REF_LEN {
            errors.push(FieldError::new(
                "image",
                format!("must be at most {MAX_IMAGE_REF_LEN} bytes"),
            ));
        }
    }

    errors
}

pub fn validate_comment_draft(draft: &CommentDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if draft.text.trim().is_empty() {
        errors.push(FieldError::new("text", "must not be blank"));
    }
    errors
}

pub fn validate_group_draft(draft: &GroupDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let title = draft.title.trim();
    if title.is_empty() {
        errors.push(FieldError::new("title", "must not be blank"));
    } else if title.chars().count() > MAX_GROUP_TITLE_LEN {
        errors.push(FieldError::new(
            "title",
            format!("must be at most {MAX_GROUP_TITLE_LEN} characters"),
        ));
    }

    if draft.slug.as_deref().is_some_and(|slug| !is_valid_slug(slug)) {
        errors.push(FieldError::new(
            "slug",
            format!("must be 1-{MAX_SLUG_LEN} characters of lowercase letters, digits or hyphens"),
        ));
    }

    errors
}

/// Usernames follow the conventional `[\w.@+-]` alphabet, up to 150 characters.
pub fn validate_username(username: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if username.is_empty() {
        errors.push(FieldError::new("username", "must not be empty"));
        return errors;
    }

    if username.chars().count() > MAX_USERNAME_LEN {
        errors.push(FieldError::new(
            "username",
            format!("must be at most {MAX_USERNAME_LEN} characters"),
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '@' | '.' | '+' | '-'))
    {
        errors.push(FieldError::new(
            "username",
            "may contain only letters, digits and @ . + - _",
        ));
    }

    errors
}
