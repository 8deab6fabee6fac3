//! Follow relationships between authors.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::repos::{AuthorsRepo, FollowsRepo, RepoError};
use crate::domain::entities::AuthorRecord;
use crate::domain::error::DomainError;
use crate::domain::types::FollowOutcome;

#[derive(Debug, Error)]
pub enum FollowError {
    #[error("authentication required")]
    Unauthenticated,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Whether `requester` follows `author_id`; anonymous and self lookups are
/// always false and never reach the store.
pub(crate) async fn follow_status(
    follows: &dyn FollowsRepo,
    requester: Option<i64>,
    author_id: i64,
) -> Result<bool, RepoError> {
    match requester {
        Some(user_id) if user_id != author_id => follows.exists(user_id, author_id).await,
        _ => Ok(false),
    }
}

#[derive(Clone)]
pub struct FollowService {
    authors: Arc<dyn AuthorsRepo>,
    follows: Arc<dyn FollowsRepo>,
}

impl FollowService {
    pub fn new(authors: Arc<dyn AuthorsRepo>, follows: Arc<dyn FollowsRepo>) -> Self {
        Self { authors, follows }
    }

    /// Subscribes the requester to `username`. Repeated calls and attempts to
    /// follow yourself succeed without changing anything.
    pub async fn follow(
        &self,
        requester: Option<i64>,
        username: &str,
    ) -> Result<FollowOutcome, FollowError> {
        let user_id = requester.ok_or(FollowError::Unauthenticated)?;
        let author = self.resolve_author(username).await?;

        if author.id == user_id {
            return Ok(FollowOutcome::SelfFollowIgnored);
        }

        let outcome = match self.follows.create_if_absent(user_id, author.id).await? {
            Some(_) => FollowOutcome::Created,
            None => FollowOutcome::AlreadyFollowing,
        };

        info!(
            target: "inkwell::follow",
            user_id,
            author_id = author.id,
            ?outcome,
            "follow requested"
        );
        Ok(outcome)
    }

    /// Removes the subscription; fails with not-found when there was none.
    pub async fn unfollow(&self, requester: Option<i64>, username: &str) -> Result<(), FollowError> {
        let user_id = requester.ok_or(FollowError::Unauthenticated)?;
        let author = self.resolve_author(username).await?;

        if !self.follows.delete(user_id, author.id).await? {
            return Err(DomainError::not_found("follow").into());
        }

        info!(
            target: "inkwell::follow",
            user_id,
            author_id = author.id,
            "unfollowed"
        );
        Ok(())
    }

    pub async fn is_following(
        &self,
        requester: Option<i64>,
        author_id: i64,
    ) -> Result<bool, FollowError> {
        follow_status(self.follows.as_ref(), requester, author_id)
            .await
            .map_err(FollowError::from)
    }

    async fn resolve_author(&self, username: &str) -> Result<AuthorRecord, FollowError> {
        self.authors
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("author").into())
    }
}
