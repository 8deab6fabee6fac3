//! Page-number pagination with conventional paginator semantics.
//!
//! Pages are 1-based. A missing or non-numeric page selects the first page;
//! a number below one or past the end resolves to the last page, so a
//! request never fails because of its page parameter.

use serde::Serialize;

/// Page number as supplied by a caller, before it is checked against a feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RequestedPage {
    #[default]
    First,
    Number(i64),
}

impl RequestedPage {
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<i64>().ok())
            .map(Self::Number)
            .unwrap_or(Self::First)
    }
}

/// Offset/limit slice of a feed selected for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    total_count: u64,
    page_size: u64,
}

impl Paginator {
    /// `page_size` of zero is treated as one.
    pub fn new(total_count: u64, page_size: u64) -> Self {
        Self {
            total_count,
            page_size: page_size.max(1),
        }
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of pages; an empty feed still has a single empty page.
    pub fn num_pages(&self) -> u64 {
        self.total_count.div_ceil(self.page_size).max(1)
    }

    pub fn resolve(&self, requested: RequestedPage) -> PageWindow {
        let last = self.num_pages();
        let number = match requested {
            RequestedPage::First => 1,
            RequestedPage::Number(n) if n >= 1 && (n as u64) <= last => n as u64,
            RequestedPage::Number(_) => last,
        };

        PageWindow {
            number,
            offset: (number - 1) * self.page_size,
            limit: self.page_size,
        }
    }

    pub fn page<T>(&self, window: PageWindow, items: Vec<T>) -> FeedPage<T> {
        let num_pages = self.num_pages();
        FeedPage {
            items,
            number: window.number,
            num_pages,
            total_count: self.total_count,
            page_size: self.page_size,
            has_prev: window.number > 1,
            has_next: window.number < num_pages,
        }
    }
}

/// One resolved page of a feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedPage<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total_count: u64,
    pub page_size: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> FeedPage<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn next_page(&self) -> Option<u64> {
        self.has_next.then_some(self.number + 1)
    }

    pub fn previous_page(&self) -> Option<u64> {
        self.has_prev.then(|| self.number - 1)
    }
}
