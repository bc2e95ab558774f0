//! Pagination primitives shared by every listing endpoint.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::book::Book;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated zero-based page index and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Applies the lenient pagination policy: out-of-range input is clamped, never rejected.
    ///
    /// - missing or negative `page` -> 0
    /// - missing or non-positive `size` -> [`DEFAULT_PAGE_SIZE`]
    /// - `size` above [`MAX_PAGE_SIZE`] -> [`MAX_PAGE_SIZE`]
    pub fn clamped(page: Option<i64>, size: Option<i64>) -> Self {
        let page = page.unwrap_or(0).clamp(0, u32::MAX as i64) as u32;
        let size = match size {
            Some(s) if s > 0 => s.min(MAX_PAGE_SIZE as i64) as u32,
            _ => DEFAULT_PAGE_SIZE,
        };
        Self { page, size }
    }

    pub fn offset(&self) -> i64 {
        self.page as i64 * self.size as i64
    }

    pub fn limit(&self) -> i64 {
        self.size as i64
    }
}

/// A page of items plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[aliases(BookPage = Page<Book>)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(rename = "books")]
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        let size = request.size.max(1) as u64;
        let total_pages = total_items.div_ceil(size).min(u32::MAX as u64) as u32;
        Self {
            items,
            current_page: request.page,
            total_items,
            total_pages,
        }
    }

    /// Slices an already ordered, fully materialized result set.
    pub fn from_ordered(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(request.size as usize)
            .collect();
        Self::new(items, request, total)
    }
}
