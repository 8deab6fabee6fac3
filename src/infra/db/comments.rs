use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::repos::{CommentsRepo, CreateCommentParams, RepoError},
    domain::entities::CommentRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: i64,
    author_username: String,
    text: String,
    created_at: OffsetDateTime,
}

impl From<CommentRow> for CommentRecord {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            author_username: row.author_username,
            text: row.text,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CommentsRepo for PostgresRepositories {
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentRecord>, RepoError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.post_id, c.author_id, a.username AS author_username,
                   c.text, c.created_at
            FROM comments c
            INNER JOIN authors a ON a.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(self.pool())
        .await
        .map_err(RepoError::from_persistence)?;

        Ok(rows.into_iter().map(CommentRecord::from).collect())
    }

    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            WITH c AS (
                INSERT INTO comments (post_id, author_id, text)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT c.id, c.post_id, c.author_id, a.username AS author_username,
                   c.text, c.created_at
            FROM c
            INNER JOIN authors a ON a.id = c.author_id
            "#,
        )
        .bind(params.post_id)
        .bind(params.author_id)
        .bind(params.text)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }
}
