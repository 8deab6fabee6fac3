use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::repos::{FollowsRepo, RepoError},
    domain::entities::FollowRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct FollowRow {
    id: i64,
    user_id: i64,
    author_id: i64,
    created_at: OffsetDateTime,
}

impl From<FollowRow> for FollowRecord {
    fn from(row: FollowRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            author_id: row.author_id,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl FollowsRepo for PostgresRepositories {
    async fn exists(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(self.pool())
        .await
        .map_err(RepoError::from_persistence)
    }

    async fn create_if_absent(
        &self,
        user_id: i64,
        author_id: i64,
    ) -> Result<Option<FollowRecord>, RepoError> {
        // Concurrent duplicates resolve through the unique pair constraint.
        let row = sqlx::query_as::<_, FollowRow>(
            r#"
            INSERT INTO follows (user_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT follows_user_author_key DO NOTHING
            RETURNING id, user_id, author_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(FollowRecord::from))
    }

    async fn delete(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
