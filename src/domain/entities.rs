//! Domain entities mirrored from persistent storage.

use std::fmt;

use serde::Serialize;
use time::OffsetDateTime;

/// Number of characters a post contributes to its short display form.
pub const POST_PREVIEW_CHARS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRecord {
    pub id: i64,
    pub username: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRecord {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub created_at: OffsetDateTime,
}

impl fmt::Display for GroupRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Compact reference to the group a post is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRef {
    pub id: i64,
    pub slug: String,
    pub title: String,
}

/// A post joined with its author's username and optional group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRecord {
    pub id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub group: Option<GroupRef>,
    pub text: String,
    /// Opaque reference to a stored image blob.
    pub image: Option<String>,
    pub created_at: OffsetDateTime,
}

impl PostRecord {
    pub fn preview(&self) -> String {
        self.text.chars().take(POST_PREVIEW_CHARS).collect()
    }
}

impl fmt::Display for PostRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.preview())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRecord {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub text: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowRecord {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
    pub created_at: OffsetDateTime,
}
