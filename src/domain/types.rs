//! Shared domain enumerations.

use serde::{Deserialize, Serialize};

/// The four post selections a feed can be composed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Global,
    Group,
    Author,
    Subscriptions,
}

impl FeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Global => "global",
            FeedKind::Group => "group",
            FeedKind::Author => "author",
            FeedKind::Subscriptions => "subscriptions",
        }
    }
}

/// Result of a follow request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowOutcome {
    Created,
    AlreadyFollowing,
    /// Following yourself is silently ignored.
    SelfFollowIgnored,
}

impl FollowOutcome {
    pub fn is_noop(&self) -> bool {
        !matches!(self, FollowOutcome::Created)
    }
}
