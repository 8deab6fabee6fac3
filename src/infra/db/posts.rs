use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;

use crate::{
    application::pagination::PageWindow,
    application::repos::{
        CreatePostParams, PostFilter, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
    },
    domain::entities::{GroupRef, PostRecord},
};

use super::{PostgresRepositories, map_sqlx_error};

/// Joined projection shared by every post read. Expects the post row as `p`.
const POST_PROJECTION: &str = "SELECT p.id, p.author_id, a.username AS author_username, \
    p.group_id, g.slug AS group_slug, g.title AS group_title, \
    p.text, p.image, p.created_at \
    FROM p \
    INNER JOIN authors a ON a.id = p.author_id \
    LEFT JOIN groups g ON g.id = p.group_id";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    author_id: i64,
    author_username: String,
    group_id: Option<i64>,
    group_slug: Option<String>,
    group_title: Option<String>,
    text: String,
    image: Option<String>,
    created_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        let group = match (row.group_id, row.group_slug, row.group_title) {
            (Some(id), Some(slug), Some(title)) => Some(GroupRef { id, slug, title }),
            _ => None,
        };

        Self {
            id: row.id,
            author_id: row.author_id,
            author_username: row.author_username,
            group,
            text: row.text,
            image: row.image,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn count_posts(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM posts p");
        Self::apply_post_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let limit = Self::convert_bound(window.limit, "limit")?;
        let offset = Self::convert_bound(window.offset, "offset")?;

        let mut qb = QueryBuilder::new("WITH p AS (SELECT * FROM posts p");
        Self::apply_post_filter(&mut qb, filter);
        qb.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);
        qb.push(") ");
        qb.push(POST_PROJECTION);
        qb.push(" ORDER BY p.created_at DESC, p.id DESC");

        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::new("WITH p AS (SELECT * FROM posts WHERE id = ");
        qb.push_bind(id);
        qb.push(") ");
        qb.push(POST_PROJECTION);

        let row = qb
            .build_query_as::<PostRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let sql = format!(
            "WITH p AS (\
                INSERT INTO posts (author_id, group_id, text, image) \
                VALUES ($1, $2, $3, $4) \
                RETURNING * \
            ) {POST_PROJECTION}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(params.author_id)
            .bind(params.group_id)
            .bind(params.text)
            .bind(params.image)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let sql = format!(
            "WITH p AS (\
                UPDATE posts SET group_id = $2, text = $3, image = $4 \
                WHERE id = $1 \
                RETURNING * \
            ) {POST_PROJECTION}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(params.id)
            .bind(params.group_id)
            .bind(params.text)
            .bind(params.image)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(PostRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_post(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
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
