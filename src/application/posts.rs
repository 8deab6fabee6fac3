use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::application::repos::{
    CommentsRepo, CreatePostParams, GroupsRepo, PostFilter, PostsRepo, PostsWriteRepo, RepoError,
    UpdatePostParams,
};
use crate::domain::entities::{CommentRecord, PostRecord};
use crate::domain::error::DomainError;
use crate::domain::validation::{PostDraft, validate_post_draft};

#[derive(Debug, Error)]
pub enum PostError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("only the author may change this post")]
    NotAuthor,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// A single post with its discussion.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostRecord,
    /// Oldest first.
    pub comments: Vec<CommentRecord>,
    pub author_post_count: u64,
}

#[derive(Clone)]
pub struct PostService {
    reader: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
    groups: Arc<dyn GroupsRepo>,
    comments: Arc<dyn CommentsRepo>,
}

impl PostService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        groups: Arc<dyn GroupsRepo>,
        comments: Arc<dyn CommentsRepo>,
    ) -> Self {
        Self {
            reader,
            writer,
            groups,
            comments,
        }
    }

    /// Publishes a post authored by the requester.
    ///
    /// Cached feed pages are left untouched; the post appears in the global
    /// feed once they expire.
    pub async fn create_post(
        &self,
        requester: Option<i64>,
        draft: PostDraft,
    ) -> Result<PostRecord, PostError> {
        let author_id = requester.ok_or(PostError::Unauthenticated)?;
        let group_id = self.checked_group(&draft).await?;

        let post = self
            .writer
            .create_post(CreatePostParams {
                author_id,
                group_id,
                text: draft.text.trim().to_string(),
                image: draft.image,
            })
            .await?;

        info!(
            target: "inkwell::posts",
            post_id = post.id,
            author_id,
            group_id = ?group_id,
            "post created"
        );
        Ok(post)
    }

    pub async fn post_detail(&self, id: i64) -> Result<PostDetail, PostError> {
        let post = self.load(id).await?;
        let comments = self.comments.list_for_post(post.id).await?;
        let author_post_count = self
            .reader
            .count_posts(&PostFilter::by_author(post.author_id))
            .await?;

        Ok(PostDetail {
            post,
            comments,
            author_post_count,
        })
    }

    /// Replaces text, group and image. The author never changes.
    pub async fn edit_post(
        &self,
        requester: Option<i64>,
        id: i64,
        draft: PostDraft,
    ) -> Result<PostRecord, PostError> {
        let existing = self.owned_by(requester, id).await?;
        let group_id = self.checked_group(&draft).await?;

        let post = self
            .writer
            .update_post(UpdatePostParams {
                id: existing.id,
                group_id,
                text: draft.text.trim().to_string(),
                image: draft.image,
            })
            .await?;

        info!(target: "inkwell::posts", post_id = post.id, "post edited");
        Ok(post)
    }

    /// Deletes the post and, with it, its comments.
    pub async fn delete_post(&self, requester: Option<i64>, id: i64) -> Result<(), PostError> {
        let existing = self.owned_by(requester, id).await?;
        self.writer.delete_post(existing.id).await?;

        info!(target: "inkwell::posts", post_id = existing.id, "post deleted");
        Ok(())
    }

    async fn load(&self, id: i64) -> Result<PostRecord, PostError> {
        self.reader
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post").into())
    }

    async fn owned_by(&self, requester: Option<i64>, id: i64) -> Result<PostRecord, PostError> {
        let user_id = requester.ok_or(PostError::Unauthenticated)?;
        let post = self.load(id).await?;
        if post.author_id != user_id {
            return Err(PostError::NotAuthor);
        }
        Ok(post)
    }

    /// Validates the draft and resolves its group slug to an id.
    async fn checked_group(&self, draft: &PostDraft) -> Result<Option<i64>, PostError> {
        let errors = validate_post_draft(draft);
        if !errors.is_empty() {
            return Err(DomainError::validation(errors).into());
        }

        let Some(slug) = draft.group.as_deref().map(str::trim) else {
            return Ok(None);
        };

        match self.groups.find_by_slug(slug).await? {
            Some(group) => Ok(Some(group.id)),
            None => Err(DomainError::invalid_field("group", format!("unknown group `{slug}`")).into()),
        }
    }
}
