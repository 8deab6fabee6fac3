//! Cache key definitions.

use crate::application::pagination::RequestedPage;
use crate::domain::types::FeedKind;

/// Identifies one cached feed page.
///
/// Keyed on the page as requested rather than as resolved, so a hit needs no
/// count query to clamp the number first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedCacheKey {
    pub kind: FeedKind,
    pub page: RequestedPage,
}

impl FeedCacheKey {
    pub fn global(page: RequestedPage) -> Self {
        Self {
            kind: FeedKind::Global,
            page,
        }
    }
}
