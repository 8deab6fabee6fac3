use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderName, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::application::authors::AuthorService;
use crate::application::comments::CommentService;
use crate::application::feed::{AuthorFeed, FeedService, GroupFeed};
use crate::application::follow::FollowService;
use crate::application::groups::GroupService;
use crate::application::pagination::{FeedPage, RequestedPage};
use crate::application::posts::{PostDetail, PostService};
use crate::application::repos::HealthRepo;
use crate::domain::entities::{CommentRecord, GroupRecord, PostRecord};
use crate::domain::types::FollowOutcome;

use super::{db_health_response, json_body};
use super::error::ApiError;
use super::middleware::{log_responses, set_request_context};
use super::models::{CommentRequest, FollowResponse, PageQuery, PostRequest};
use super::requester::Requester;

#[derive(Clone)]
pub struct HttpState {
    pub feed: Arc<FeedService>,
    pub follow: Arc<FollowService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub groups: Arc<GroupService>,
    pub authors: Arc<AuthorService>,
    pub health: Arc<dyn HealthRepo>,
    /// Header the upstream proxy uses to pass the signed-in author's id.
    pub identity_header: HeaderName,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(global_feed))
        .route("/group/{slug}/", get(group_feed))
        .route("/profile/{username}/", get(profile_feed))
        .route("/profile/{username}/follow/", post(follow_author))
        .route("/profile/{username}/unfollow/", post(unfollow_author))
        .route("/follow/", get(subscription_feed))
        .route("/create/", post(create_post))
        .route("/posts/{id}/", get(post_detail))
        .route("/posts/{id}/edit/", post(edit_post))
        .route("/posts/{id}/delete/", post(delete_post))
        .route("/posts/{id}/comment/", post(add_comment))
        .route("/groups/", get(list_groups))
        .route("/_health/db", get(public_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

fn requested_page(query: &PageQuery) -> RequestedPage {
    RequestedPage::parse(query.page.as_deref())
}

/// Ids that are not integers can never name a post.
fn post_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::not_found(Some("post not found".to_string())))
}

async fn global_feed(
    State(state): State<HttpState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<FeedPage<PostRecord>>, ApiError> {
    let page = state.feed.global_feed(requested_page(&query)).await?;
    Ok(Json(page))
}

async fn group_feed(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<GroupFeed>, ApiError> {
    let feed = state.feed.group_feed(&slug, requested_page(&query)).await?;
    Ok(Json(feed))
}

async fn profile_feed(
    State(state): State<HttpState>,
    requester: Requester,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<AuthorFeed>, ApiError> {
    let feed = state
        .feed
        .author_feed(&username, requested_page(&query), requester.id())
        .await?;
    Ok(Json(feed))
}

async fn subscription_feed(
    State(state): State<HttpState>,
    requester: Requester,
    Query(query): Query<PageQuery>,
) -> Result<Json<FeedPage<PostRecord>>, ApiError> {
    let page = state
        .feed
        .subscription_feed(requester.id(), requested_page(&query))
        .await?;
    Ok(Json(page))
}

async fn follow_author(
    State(state): State<HttpState>,
    requester: Requester,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let outcome = state.follow.follow(requester.id(), &username).await?;
    let status = match outcome {
        FollowOutcome::Created => StatusCode::CREATED,
        FollowOutcome::AlreadyFollowing | FollowOutcome::SelfFollowIgnored => StatusCode::OK,
    };
    Ok((status, Json(FollowResponse { outcome })).into_response())
}

async fn unfollow_author(
    State(state): State<HttpState>,
    requester: Requester,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.follow.unfollow(requester.id(), &username).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_post(
    State(state): State<HttpState>,
    requester: Requester,
    payload: Result<Json<PostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostRecord>), ApiError> {
    let draft = json_body(payload)?.into();
    let post = state.posts.create_post(requester.id(), draft).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn post_detail(
    State(state): State<HttpState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<PostDetail>, ApiError> {
    let detail = state.posts.post_detail(post_id(path)?).await?;
    Ok(Json(detail))
}

async fn edit_post(
    State(state): State<HttpState>,
    requester: Requester,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PostRequest>, JsonRejection>,
) -> Result<Json<PostRecord>, ApiError> {
    let id = post_id(path)?;
    let draft = json_body(payload)?.into();
    let post = state.posts.edit_post(requester.id(), id, draft).await?;
    Ok(Json(post))
}

async fn delete_post(
    State(state): State<HttpState>,
    requester: Requester,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    state.posts.delete_post(requester.id(), post_id(path)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_comment(
    State(state): State<HttpState>,
    requester: Requester,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CommentRecord>), ApiError> {
    let id = post_id(path)?;
    let draft = json_body(payload)?.into();
    let comment = state.comments.add_comment(requester.id(), id, draft).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_groups(State(state): State<HttpState>) -> Result<Json<Vec<GroupRecord>>, ApiError> {
    let groups = state.groups.list_groups().await?;
    Ok(Json(groups))
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.health.ping().await)
}
