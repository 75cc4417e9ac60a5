//! Page-based pagination converted to offset/limit.

/// A 1-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    page: i64,
    page_size: i64,
}

impl Page {
    /// Values below 1 are clamped to 1.
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Zero-based number of rows to skip.
    pub fn offset(&self) -> i64 {
        self.page_size.saturating_mul(self.page - 1)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}
