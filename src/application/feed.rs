//! Feed composition: the four post selections, paginated.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::application::follow::follow_status;
use crate::application::pagination::{FeedPage, Paginator, RequestedPage};
use crate::application::repos::{
    AuthorsRepo, FollowsRepo, GroupsRepo, PostFilter, PostsRepo, RepoError,
};
use crate::cache::{FeedCache, FeedCacheKey};
use crate::domain::entities::{AuthorRecord, GroupRecord, PostRecord};
use crate::domain::error::DomainError;
use crate::domain::types::FeedKind;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("authentication required")]
    Unauthenticated,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupFeed {
    pub group: GroupRecord,
    pub page: FeedPage<PostRecord>,
}

/// An author's profile feed.
///
/// `following` is only ever true for a signed-in requester other than the
/// author.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorFeed {
    pub author: AuthorRecord,
    pub post_count: u64,
    pub following: bool,
    pub page: FeedPage<PostRecord>,
}

#[derive(Clone)]
pub struct FeedService {
    authors: Arc<dyn AuthorsRepo>,
    groups: Arc<dyn GroupsRepo>,
    posts: Arc<dyn PostsRepo>,
    follows: Arc<dyn FollowsRepo>,
    cache: Arc<FeedCache>,
    page_size: u64,
}

impl FeedService {
    pub fn new(
        authors: Arc<dyn AuthorsRepo>,
        groups: Arc<dyn GroupsRepo>,
        posts: Arc<dyn PostsRepo>,
        follows: Arc<dyn FollowsRepo>,
        cache: Arc<FeedCache>,
        page_size: u64,
    ) -> Self {
        Self {
            authors,
            groups,
            posts,
            follows,
            cache,
            page_size,
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Every post, newest first. Served from the page cache while fresh.
    pub async fn global_feed(
        &self,
        requested: RequestedPage,
    ) -> Result<FeedPage<PostRecord>, FeedError> {
        let key = FeedCacheKey::global(requested);
        if let Some(page) = self.cache.get(&key) {
            return Ok(page);
        }

        let page = self
            .compose(FeedKind::Global, PostFilter::all(), requested)
            .await?;
        self.cache.put(key, page.clone());
        Ok(page)
    }

    pub async fn group_feed(
        &self,
        slug: &str,
        requested: RequestedPage,
    ) -> Result<GroupFeed, FeedError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group"))?;

        let page = self
            .compose(FeedKind::Group, PostFilter::by_group(group.id), requested)
            .await?;
        Ok(GroupFeed { group, page })
    }

    pub async fn author_feed(
        &self,
        username: &str,
        requested: RequestedPage,
        requester: Option<i64>,
    ) -> Result<AuthorFeed, FeedError> {
        let author = self
            .authors
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("author"))?;

        let page = self
            .compose(FeedKind::Author, PostFilter::by_author(author.id), requested)
            .await?;
        let following = follow_status(self.follows.as_ref(), requester, author.id).await?;

        Ok(AuthorFeed {
            post_count: page.total_count,
            following,
            author,
            page,
        })
    }

    /// Posts by everyone the requester follows.
    pub async fn subscription_feed(
        &self,
        requester: Option<i64>,
        requested: RequestedPage,
    ) -> Result<FeedPage<PostRecord>, FeedError> {
        let user_id = requester.ok_or(FeedError::Unauthenticated)?;
        self.compose(
            FeedKind::Subscriptions,
            PostFilter::followed_by(user_id),
            requested,
        )
        .await
        .map_err(FeedError::from)
    }

    /// Drops every cached page so the next request recomposes from the store.
    /// Returns how many pages were dropped.
    pub fn clear_cache(&self) -> usize {
        let dropped = self.cache.len();
        self.cache.clear();
        info!(target: "inkwell::feed", dropped, "feed cache cleared on request");
        dropped
    }

    async fn compose(
        &self,
        kind: FeedKind,
        filter: PostFilter,
        requested: RequestedPage,
    ) -> Result<FeedPage<PostRecord>, RepoError> {
        let total = self.posts.count_posts(&filter).await?;
        let paginator = Paginator::new(total, self.page_size);
        let window = paginator.resolve(requested);

        let items = if total == 0 {
            Vec::new()
        } else {
            self.posts.list_posts(&filter, window).await?
        };

        debug!(
            target: "inkwell::feed",
            kind = kind.as_str(),
            page = window.number,
            num_pages = paginator.num_pages(),
            total,
            "composed feed page"
        );

        Ok(paginator.page(window, items))
    }
}
