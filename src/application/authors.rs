use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::repos::{AuthorsRepo, RepoError};
use crate::domain::entities::AuthorRecord;
use crate::domain::error::DomainError;
use crate::domain::validation::validate_username;

#[derive(Debug, Error)]
pub enum AuthorError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Author accounts. Credentials live with the upstream identity provider;
/// this service only records the identities posts are attributed to.
#[derive(Clone)]
pub struct AuthorService {
    authors: Arc<dyn AuthorsRepo>,
}

impl AuthorService {
    pub fn new(authors: Arc<dyn AuthorsRepo>) -> Self {
        Self { authors }
    }

    pub async fn register(&self, username: &str) -> Result<AuthorRecord, AuthorError> {
        let errors = validate_username(username);
        if !errors.is_empty() {
            return Err(DomainError::validation(errors).into());
        }

        let author = match self.authors.create_author(username).await {
            Ok(author) => author,
            Err(RepoError::Duplicate { .. }) => {
                return Err(DomainError::invalid_field(
                    "username",
                    format!("`{username}` is already taken"),
                )
                .into());
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            target: "inkwell::authors",
            author_id = author.id,
            username = %author.username,
            "author registered"
        );
        Ok(author)
    }

    pub async fn find(&self, username: &str) -> Result<AuthorRecord, AuthorError> {
        self.authors
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("author").into())
    }

    /// Looks up the author behind an authenticated identity.
    pub async fn find_by_id(&self, id: i64) -> Result<AuthorRecord, AuthorError> {
        self.authors
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("author").into())
    }

    /// Removes the author along with their posts, comments and follows.
    pub async fn delete(&self, username: &str) -> Result<(), AuthorError> {
        let author = self.find(username).await?;
        self.authors.delete_author(author.id).await?;

        info!(
            target: "inkwell::authors",
            author_id = author.id,
            username,
            "author deleted"
        );
        Ok(())
    }
}
