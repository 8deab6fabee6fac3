//! Operator surface, bound to its own listener.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::Response,
    routing::{delete, get, post},
};

use crate::application::authors::AuthorService;
use crate::application::feed::FeedService;
use crate::application::groups::GroupService;
use crate::application::repos::HealthRepo;
use crate::domain::entities::{AuthorRecord, GroupRecord};

use super::{db_health_response, json_body};
use super::error::ApiError;
use super::middleware::{log_responses, set_request_context};
use super::models::{AuthorCreateRequest, CacheClearResponse, GroupCreateRequest};

#[derive(Clone)]
pub struct AdminState {
    pub authors: Arc<AuthorService>,
    pub groups: Arc<GroupService>,
    pub feed: Arc<FeedService>,
    pub health: Arc<dyn HealthRepo>,
}

pub fn build_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/authors", post(create_author))
        .route("/authors/{username}", delete(delete_author))
        .route("/groups", post(create_group))
        .route("/groups/{slug}", delete(delete_group))
        .route("/cache/clear", post(clear_cache))
        .route("/_health/db", get(admin_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn create_author(
    State(state): State<AdminState>,
    payload: Result<Json<AuthorCreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthorRecord>), ApiError> {
    let request = json_body(payload)?;
    let author = state.authors.register(&request.username).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

async fn delete_author(
    State(state): State<AdminState>,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.authors.delete(&username).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_group(
    State(state): State<AdminState>,
    payload: Result<Json<GroupCreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GroupRecord>), ApiError> {
    let draft = json_body(payload)?.into();
    let group = state.groups.create_group(draft).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

async fn delete_group(
    State(state): State<AdminState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.groups.delete_group(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_cache(State(state): State<AdminState>) -> Json<CacheClearResponse> {
    Json(CacheClearResponse {
        cleared: state.feed.clear_cache(),
    })
}

async fn admin_health(State(state): State<AdminState>) -> Response {
    db_health_response(state.health.ping().await)
}
