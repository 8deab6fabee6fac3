//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::application::pagination::PageWindow;
use crate::domain::entities::{
    AuthorRecord, CommentRecord, FollowRecord, GroupRecord, PostRecord,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Selection applied to the post table before ordering and slicing.
///
/// All set fields must match. The default filter selects every post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub group_id: Option<i64>,
    pub author_id: Option<i64>,
    /// Restrict to authors followed by this user.
    pub followed_by: Option<i64>,
}

impl PostFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_group(group_id: i64) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    pub fn by_author(author_id: i64) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }

    pub fn followed_by(user_id: i64) -> Self {
        Self {
            followed_by: Some(user_id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateGroupParams {
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub text: String,
    pub image: Option<String>,
}

/// The author of a post is never part of an update.
#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub id: i64,
    pub group_id: Option<i64>,
    pub text: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateCommentParams {
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
}

#[async_trait]
pub trait AuthorsRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<AuthorRecord>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<AuthorRecord>, RepoError>;

    async fn create_author(&self, username: &str) -> Result<AuthorRecord, RepoError>;

    /// Removes the author together with their posts, comments and follows.
    async fn delete_author(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait GroupsRepo: Send + Sync {
    async fn list_groups(&self) -> Result<Vec<GroupRecord>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError>;

    async fn create_group(&self, params: CreateGroupParams) -> Result<GroupRecord, RepoError>;

    /// Removes the group; its posts remain without a group.
    async fn delete_group(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn count_posts(&self, filter: &PostFilter) -> Result<u64, RepoError>;

    /// Posts matching `filter`, newest first with ties broken by descending id.
    async fn list_posts(
        &self,
        filter: &PostFilter,
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError>;

    async fn delete_post(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    /// Comments on a post, oldest first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentRecord>, RepoError>;

    async fn create_comment(&self, params: CreateCommentParams)
    -> Result<CommentRecord, RepoError>;
}

#[async_trait]
pub trait FollowsRepo: Send + Sync {
    async fn exists(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError>;

    /// Inserts the pair unless it is already present; `None` means nothing changed.
    async fn create_if_absent(
        &self,
        user_id: i64,
        author_id: i64,
    ) -> Result<Option<FollowRecord>, RepoError>;

    /// Returns whether a pair was removed.
    async fn delete(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
