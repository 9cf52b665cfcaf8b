use std::ops::Range;

pub const PAGE_SIZE: usize = 5;

/// 1-based page cursor over the filtered rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self { page: 1 }
    }
}

impl Pager {
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(count: usize) -> usize {
        count.div_ceil(PAGE_SIZE).max(1)
    }

    /// Pull the cursor back into `[1, total_pages(count)]`.
    pub fn clamp(&mut self, count: usize) {
        self.page = self.page.clamp(1, Self::total_pages(count));
    }

    pub fn go_to(&mut self, page: usize, count: usize) {
        self.page = page;
        self.clamp(count);
    }

    pub fn next(&mut self, count: usize) {
        self.go_to(self.page + 1, count);
    }

    pub fn prev(&mut self, count: usize) {
        self.go_to(self.page.saturating_sub(1), count);
    }

    pub fn last(&mut self, count: usize) {
        self.page = Self::total_pages(count);
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self, count: usize) -> bool {
        self.page < Self::total_pages(count)
    }

    /// Indices of the rows shown on the current page.
    pub fn range(&self, count: usize) -> Range<usize> {
        let page = self.page.clamp(1, Self::total_pages(count));
        let start = ((page - 1) * PAGE_SIZE).min(count);
        let end = (start + PAGE_SIZE).min(count);
        start..end
    }

    /// "Showing 6-10 of 12", or "No entries".
    pub fn summary(&self, count: usize) -> String {
        if count == 0 {
            return "No entries".to_string();
        }
        let range = self.range(count);
        format!("Showing {}-{} of {}", range.start + 1, range.end, count)
    }
}
