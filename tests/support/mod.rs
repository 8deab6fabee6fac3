//! In-memory repositories and service wiring shared by the integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use time::{Duration, OffsetDateTime, macros::datetime};
use tokio::sync::Mutex;

use inkwell::application::authors::AuthorService;
use inkwell::application::comments::CommentService;
use inkwell::application::feed::FeedService;
use inkwell::application::follow::FollowService;
use inkwell::application::groups::GroupService;
use inkwell::application::pagination::PageWindow;
use inkwell::application::posts::PostService;
use inkwell::application::repos::{
    AuthorsRepo, CommentsRepo, CreateCommentParams, CreateGroupParams, CreatePostParams,
    FollowsRepo, GroupsRepo, HealthRepo, PostFilter, PostsRepo, PostsWriteRepo, RepoError,
    UpdatePostParams,
};
use inkwell::cache::{CacheConfig, FeedCache};
use inkwell::domain::entities::{
    AuthorRecord, CommentRecord, FollowRecord, GroupRecord, GroupRef, PostRecord,
};

const EPOCH: OffsetDateTime = datetime!(2026-01-01 00:00 UTC);

#[derive(Clone)]
struct StoredPost {
    id: i64,
    author_id: i64,
    group_id: Option<i64>,
    text: String,
    image: Option<String>,
    created_at: OffsetDateTime,
}

#[derive(Clone)]
struct StoredComment {
    id: i64,
    post_id: i64,
    author_id: i64,
    text: String,
    created_at: OffsetDateTime,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    ticks: i64,
    frozen: bool,
    authors: BTreeMap<i64, AuthorRecord>,
    groups: BTreeMap<i64, GroupRecord>,
    posts: BTreeMap<i64, StoredPost>,
    comments: BTreeMap<i64, StoredComment>,
    follows: BTreeMap<i64, FollowRecord>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Every insert is one second after the previous one unless the clock is frozen.
    fn now(&mut self) -> OffsetDateTime {
        if !self.frozen {
            self.ticks += 1;
        }
        EPOCH + Duration::seconds(self.ticks)
    }

    fn project_post(&self, post: &StoredPost) -> PostRecord {
        let author_username = self
            .authors
            .get(&post.author_id)
            .map(|author| author.username.clone())
            .unwrap_or_default();
        let group = post
            .group_id
            .and_then(|id| self.groups.get(&id))
            .map(|group| GroupRef {
                id: group.id,
                slug: group.slug.clone(),
                title: group.title.clone(),
            });

        PostRecord {
            id: post.id,
            author_id: post.author_id,
            author_username,
            group,
            text: post.text.clone(),
            image: post.image.clone(),
            created_at: post.created_at,
        }
    }

    fn matches(&self, post: &StoredPost, filter: &PostFilter) -> bool {
        if filter.group_id.is_some_and(|id| post.group_id != Some(id)) {
            return false;
        }
        if filter.author_id.is_some_and(|id| post.author_id != id) {
            return false;
        }
        if let Some(user_id) = filter.followed_by {
            return self
                .follows
                .values()
                .any(|f| f.user_id == user_id && f.author_id == post.author_id);
        }
        true
    }

    fn check_author(&self, id: i64) -> Result<(), RepoError> {
        if self.authors.contains_key(&id) {
            Ok(())
        } else {
            Err(RepoError::InvalidInput {
                message: format!("author {id} does not exist"),
            })
        }
    }
}

/// Mirrors the Postgres schema's cascade rules.
#[derive(Default)]
pub struct InMemoryRepositories {
    tables: Mutex<Tables>,
    list_calls: AtomicUsize,
    ping_fails: AtomicBool,
}

impl InMemoryRepositories {
    /// Subsequent inserts share one timestamp until [`Self::thaw_clock`].
    pub async fn freeze_clock(&self) {
        self.tables.lock().await.frozen = true;
    }

    pub async fn thaw_clock(&self) {
        self.tables.lock().await.frozen = false;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fail_pings(&self) {
        self.ping_fails.store(true, Ordering::SeqCst);
    }

    pub async fn post_count(&self) -> usize {
        self.tables.lock().await.posts.len()
    }

    pub async fn comment_count(&self) -> usize {
        self.tables.lock().await.comments.len()
    }

    pub async fn follow_count(&self) -> usize {
        self.tables.lock().await.follows.len()
    }
}

#[async_trait]
impl AuthorsRepo for InMemoryRepositories {
    async fn find_by_id(&self, id: i64) -> Result<Option<AuthorRecord>, RepoError> {
        Ok(self.tables.lock().await.authors.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<AuthorRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .authors
            .values()
            .find(|author| author.username == username)
            .cloned())
    }

    async fn create_author(&self, username: &str) -> Result<AuthorRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        if tables.authors.values().any(|a| a.username == username) {
            return Err(RepoError::Duplicate {
                constraint: "authors_username_key".to_string(),
            });
        }
        let author = AuthorRecord {
            id: tables.next_id(),
            username: username.to_string(),
            created_at: tables.now(),
        };
        tables.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn delete_author(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.lock().await;
        if tables.authors.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        tables.posts.retain(|_, post| post.author_id != id);
        let posts: Vec<i64> = tables.posts.keys().copied().collect();
        tables
            .comments
            .retain(|_, c| c.author_id != id && posts.contains(&c.post_id));
        tables
            .follows
            .retain(|_, f| f.user_id != id && f.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl GroupsRepo for InMemoryRepositories {
    async fn list_groups(&self) -> Result<Vec<GroupRecord>, RepoError> {
        let tables = self.tables.lock().await;
        let mut groups: Vec<GroupRecord> = tables.groups.values().cloned().collect();
        groups.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Ok(groups)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn create_group(&self, params: CreateGroupParams) -> Result<GroupRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        if tables.groups.values().any(|g| g.slug == params.slug) {
            return Err(RepoError::Duplicate {
                constraint: "groups_slug_key".to_string(),
            });
        }
        let group = GroupRecord {
            id: tables.next_id(),
            title: params.title,
            slug: params.slug,
            description: params.description,
            created_at: tables.now(),
        };
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn delete_group(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.lock().await;
        if tables.groups.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        for post in tables.posts.values_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PostsRepo for InMemoryRepositories {
    async fn count_posts(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .posts
            .values()
            .filter(|post| tables.matches(post, filter))
            .count() as u64)
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().await;
        let mut posts: Vec<&StoredPost> = tables
            .posts
            .values()
            .filter(|post| tables.matches(post, filter))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(posts
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .map(|post| tables.project_post(post))
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.posts.get(&id).map(|post| tables.project_post(post)))
    }
}

#[async_trait]
impl PostsWriteRepo for InMemoryRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        tables.check_author(params.author_id)?;
        let post = StoredPost {
            id: tables.next_id(),
            author_id: params.author_id,
            group_id: params.group_id,
            text: params.text,
            image: params.image,
            created_at: tables.now(),
        };
        tables.posts.insert(post.id, post.clone());
        Ok(tables.project_post(&post))
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let post = tables.posts.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        post.group_id = params.group_id;
        post.text = params.text;
        post.image = params.image;
        let post = post.clone();
        Ok(tables.project_post(&post))
    }

    async fn delete_post(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.lock().await;
        if tables.posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        tables.comments.retain(|_, c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentsRepo for InMemoryRepositories {
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentRecord>, RepoError> {
        let tables = self.tables.lock().await;
        let mut comments: Vec<&StoredComment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(comments
            .into_iter()
            .map(|c| CommentRecord {
                id: c.id,
                post_id: c.post_id,
                author_id: c.author_id,
                author_username: tables
                    .authors
                    .get(&c.author_id)
                    .map(|a| a.username.clone())
                    .unwrap_or_default(),
                text: c.text.clone(),
                created_at: c.created_at,
            })
            .collect())
    }

    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        tables.check_author(params.author_id)?;
        if !tables.posts.contains_key(&params.post_id) {
            return Err(RepoError::InvalidInput {
                message: format!("post {} does not exist", params.post_id),
            });
        }
        let comment = StoredComment {
            id: tables.next_id(),
            post_id: params.post_id,
            author_id: params.author_id,
            text: params.text,
            created_at: tables.now(),
        };
        tables.comments.insert(comment.id, comment.clone());
        let author_username = tables
            .authors
            .get(&comment.author_id)
            .map(|a| a.username.clone())
            .unwrap_or_default();

        Ok(CommentRecord {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author_username,
            text: comment.text,
            created_at: comment.created_at,
        })
    }
}

#[async_trait]
impl FollowsRepo for InMemoryRepositories {
    async fn exists(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .follows
            .values()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn create_if_absent(
        &self,
        user_id: i64,
        author_id: i64,
    ) -> Result<Option<FollowRecord>, RepoError> {
        let mut tables = self.tables.lock().await;
        tables.check_author(user_id)?;
        tables.check_author(author_id)?;
        if user_id == author_id {
            return Err(RepoError::Integrity {
                message: "follows_no_self_follow".to_string(),
            });
        }
        if tables
            .follows
            .values()
            .any(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Ok(None);
        }
        let follow = FollowRecord {
            id: tables.next_id(),
            user_id,
            author_id,
            created_at: tables.now(),
        };
        tables.follows.insert(follow.id, follow.clone());
        Ok(Some(follow))
    }

    async fn delete(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError> {
        let mut tables = self.tables.lock().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|_, f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(tables.follows.len() != before)
    }
}

#[async_trait]
impl HealthRepo for InMemoryRepositories {
    async fn ping(&self) -> Result<(), RepoError> {
        if self.ping_fails.load(Ordering::SeqCst) {
            Err(RepoError::Timeout)
        } else {
            Ok(())
        }
    }
}

/// Every service wired over one in-memory store.
pub struct Harness {
    pub repos: Arc<InMemoryRepositories>,
    pub cache: Arc<FeedCache>,
    pub feed: Arc<FeedService>,
    pub follow: Arc<FollowService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub groups: Arc<GroupService>,
    pub authors: Arc<AuthorService>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_cache(CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        })
    }

    pub fn with_cache(config: CacheConfig) -> Self {
        let repos = Arc::new(InMemoryRepositories::default());
        let cache = Arc::new(FeedCache::new(&config));
        let feed = Arc::new(FeedService::new(
            repos.clone(),
            repos.clone(),
            repos.clone(),
            repos.clone(),
            cache.clone(),
            10,
        ));

        Self {
            follow: Arc::new(FollowService::new(repos.clone(), repos.clone())),
            posts: Arc::new(PostService::new(
                repos.clone(),
                repos.clone(),
                repos.clone(),
                repos.clone(),
            )),
            comments: Arc::new(CommentService::new(repos.clone(), repos.clone())),
            groups: Arc::new(GroupService::new(repos.clone())),
            authors: Arc::new(AuthorService::new(repos.clone())),
            repos,
            cache,
            feed,
        }
    }

    pub async fn author(&self, username: &str) -> AuthorRecord {
        self.authors
            .register(username)
            .await
            .expect("register author")
    }

    pub async fn group(&self, title: &str, slug: &str) -> GroupRecord {
        self.groups
            .create_group(inkwell::domain::validation::GroupDraft {
                title: title.to_string(),
                slug: Some(slug.to_string()),
                description: String::new(),
            })
            .await
            .expect("create group")
    }

    pub async fn post(&self, author: &AuthorRecord, text: &str, group: Option<&str>) -> PostRecord {
        self.posts
            .create_post(
                Some(author.id),
                inkwell::domain::validation::PostDraft {
                    text: text.to_string(),
                    group: group.map(str::to_string),
                    image: None,
                },
            )
            .await
            .expect("create post")
    }
}
