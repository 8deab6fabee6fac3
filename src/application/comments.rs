use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::repos::{CommentsRepo, CreateCommentParams, PostsRepo, RepoError};
use crate::domain::entities::CommentRecord;
use crate::domain::error::DomainError;
use crate::domain::validation::{CommentDraft, validate_comment_draft};

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("authentication required")]
    Unauthenticated,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct CommentService {
    posts: Arc<dyn PostsRepo>,
    comments: Arc<dyn CommentsRepo>,
}

impl CommentService {
    pub fn new(posts: Arc<dyn PostsRepo>, comments: Arc<dyn CommentsRepo>) -> Self {
        Self { posts, comments }
    }

    pub async fn add_comment(
        &self,
        requester: Option<i64>,
        post_id: i64,
        draft: CommentDraft,
    ) -> Result<CommentRecord, CommentError> {
        let author_id = requester.ok_or(CommentError::Unauthenticated)?;

        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(DomainError::not_found("post").into());
        }

        let errors = validate_comment_draft(&draft);
        if !errors.is_empty() {
            return Err(DomainError::validation(errors).into());
        }

        let comment = self
            .comments
            .create_comment(CreateCommentParams {
                post_id,
                author_id,
                text: draft.text.trim().to_string(),
            })
            .await?;

        info!(
            target: "inkwell::comments",
            comment_id = comment.id,
            post_id,
            author_id,
            "comment added"
        );
        Ok(comment)
    }
}
