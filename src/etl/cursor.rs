//! Pagination bookkeeping for multi-page sources

/// How a source delivers its records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// Everything arrives in one response
    Single,
    /// Records are fetched `page_size` at a time after a probe for totals
    Multi { page_size: u32 },
}

/// Query parameters of a paged request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u64, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// `page` and `pageSize` query parameters
    pub fn query(&self) -> [(&'static str, u64); 2] {
        [("page", self.page), ("pageSize", u64::from(self.page_size))]
    }
}

/// Totals reported by a probe request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub total_count: u64,
    pub total_pages: u64,
}

impl Totals {
    pub fn new(total_count: u64, total_pages: u64) -> Self {
        Self {
            total_count,
            total_pages,
        }
    }

    /// A source reporting fewer than one record or page has nothing to fetch
    pub fn is_empty(&self) -> bool {
        self.total_count < 1 || self.total_pages < 1
    }
}

/// Rows processed so far out of the total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: u64,
    pub total: u64,
}

impl Progress {
    pub fn new(processed: u64, total: u64) -> Self {
        Self { processed, total }
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} out of {}", self.processed, self.total)
    }
}

/// Walks pages 1..=n until `page * page_size >= total_count`
#[derive(Debug, Clone)]
pub struct PageCursor {
    page: u64,
    page_size: u32,
    totals: Totals,
}

impl PageCursor {
    pub fn new(page_size: u32, totals: Totals) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            totals,
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }

    fn covered(&self) -> u64 {
        self.page.saturating_mul(u64::from(self.page_size))
    }

    /// Progress once the current page is processed, never above the total
    pub fn progress(&self) -> Progress {
        Progress::new(
            self.covered().min(self.totals.total_count),
            self.totals.total_count,
        )
    }

    /// Whether the current page reaches the end of the collection
    pub fn is_last(&self) -> bool {
        self.covered() >= self.totals.total_count
    }

    /// Move to the next page; returns false once the last page was reached
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.page += 1;
        true
    }
}
