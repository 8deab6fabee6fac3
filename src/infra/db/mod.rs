//! Postgres-backed repository implementations.

mod authors;
mod comments;
mod follows;
mod groups;
mod posts;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{
    Postgres, QueryBuilder,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::{HealthRepo, PostFilter, RepoError};

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    /// Appends the `WHERE` clause for `filter`; posts are aliased `p`.
    fn apply_post_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &PostFilter) {
        qb.push(" WHERE TRUE");

        if let Some(group_id) = filter.group_id {
            qb.push(" AND p.group_id = ");
            qb.push_bind(group_id);
        }

        if let Some(author_id) = filter.author_id {
            qb.push(" AND p.author_id = ");
            qb.push_bind(author_id);
        }

        if let Some(user_id) = filter.followed_by {
            qb.push(" AND p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = ");
            qb.push_bind(user_id);
            qb.push(")");
        }
    }

    fn convert_count(value: i64) -> Result<u64, RepoError> {
        value
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }

    fn convert_bound(value: u64, what: &str) -> Result<i64, RepoError> {
        i64::try_from(value).map_err(|_| RepoError::InvalidInput {
            message: format!("{what} {value} exceeds supported range"),
        })
    }
}

#[async_trait]
impl HealthRepo for PostgresRepositories {
    async fn ping(&self) -> Result<(), RepoError> {
        self.health_check().await.map_err(map_sqlx_error)
    }
}
