//! Paged query results.

use serde::Serialize;

/// One page of a larger result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageData<T> {
    /// 1-based page number.
    pub page_index: u64,
    pub page_size: u64,
    /// Rows matching the query across all pages.
    pub total: u64,
    pub data: Vec<T>,
}

impl<T> PageData<T> {
    pub fn new(page_index: u64, page_size: u64, total: u64, data: Vec<T>) -> Self {
        Self {
            page_index,
            page_size,
            total,
            data,
        }
    }

    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            0
        } else {
            self.total.div_ceil(self.page_size)
        }
    }

    pub fn has_next(&self) -> bool {
        self.page_index < self.page_count()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageData<U> {
        PageData {
            page_index: self.page_index,
            page_size: self.page_size,
            total: self.total,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}
