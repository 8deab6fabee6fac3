use serde::{Deserialize, Serialize};

use crate::domain::types::FollowOutcome;
use crate::domain::validation::{CommentDraft, GroupDraft, PostDraft};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Kept as text; anything that is not an integer means the first page.
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<PostRequest> for PostDraft {
    fn from(request: PostRequest) -> Self {
        PostDraft {
            text: request.text,
            group: request.group,
            image: request.image,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

impl From<CommentRequest> for CommentDraft {
    fn from(request: CommentRequest) -> Self {
        CommentDraft { text: request.text }
    }
}

#[derive(Debug, Deserialize)]
pub struct GroupCreateRequest {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl From<GroupCreateRequest> for GroupDraft {
    fn from(request: GroupCreateRequest) -> Self {
        GroupDraft {
            title: request.title,
            slug: request.slug.filter(|slug| !slug.trim().is_empty()),
            description: request.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthorCreateRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub outcome: FollowOutcome,
}

#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    pub cleared: usize,
}
