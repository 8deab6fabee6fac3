use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::repos::{AuthorsRepo, RepoError},
    domain::entities::AuthorRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct AuthorRow {
    id: i64,
    username: String,
    created_at: OffsetDateTime,
}

impl From<AuthorRow> for AuthorRecord {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl AuthorsRepo for PostgresRepositories {
    async fn find_by_id(&self, id: i64) -> Result<Option<AuthorRecord>, RepoError> {
        let row = sqlx::query_as::<_, AuthorRow>(
            "SELECT id, username, created_at FROM authors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(RepoError::from_persistence)?;

        Ok(row.map(AuthorRecord::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<AuthorRecord>, RepoError> {
        let row = sqlx::query_as::<_, AuthorRow>(
            "SELECT id, username, created_at FROM authors WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await
        .map_err(RepoError::from_persistence)?;

        Ok(row.map(AuthorRecord::from))
    }

    async fn create_author(&self, username: &str) -> Result<AuthorRecord, RepoError> {
        let row = sqlx::query_as::<_, AuthorRow>(
            r#"
            INSERT INTO authors (username)
            VALUES ($1)
            RETURNING id, username, created_at
            "#,
        )
        .bind(username)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_author(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
