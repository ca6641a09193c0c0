//! Paginated results and the response envelope

use serde::Serialize;

/// One page of items plus what is needed to compute page metadata
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedList<T> {
    pub items: Vec<T>,
    /// Current page number (starts at 1)
    pub page: usize,
    pub per_page: usize,
    /// Matches before slicing
    pub total_count: usize,
}

impl<T> PaginatedList<T> {
    pub fn new(items: Vec<T>, page: usize, per_page: usize, total_count: usize) -> Self {
        Self {
            items,
            page,
            per_page,
            total_count,
        }
    }

    /// `ceil(total_count / per_page)`, zero when there is nothing to page
    pub fn total_pages(&self) -> usize {
        if self.per_page == 0 || self.total_count == 0 {
            0
        } else {
            self.total_count.div_ceil(self.per_page)
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedList<U> {
        PaginatedList {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_count: self.total_count,
        }
    }

    pub fn into_result(self) -> PaginatedResult<T> {
        let total_pages = self.total_pages();
        PaginatedResult {
            data: self.items,
            current_page: self.page,
            items_per_page: self.per_page,
            total_items: self.total_count,
            total_pages,
        }
    }
}

/// Response envelope of list endpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}
