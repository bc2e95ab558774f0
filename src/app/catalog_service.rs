//! Read-side catalog queries.
//!
//! Sits between the HTTP handlers and the repository and owns the pagination policy, so
//! every listing endpoint clamps its `page`/`size` input the same way.

use crate::domain::{Book, Page, PageRequest};
use crate::storage::{BookRepository, RepositoryResult};
use std::sync::Arc;

#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn BookRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn BookRepository>) -> Self {
        Self { repo }
    }

    /// All books, sorted by title.
    pub async fn list(&self, page: Option<i64>, size: Option<i64>) -> RepositoryResult<Page<Book>> {
        let request = PageRequest::clamped(page, size);
        log::debug!("list books page={} size={}", request.page, request.size);
        self.repo.find_all(request).await
    }

    /// `None` if no book has this id.
    pub async fn get(&self, id: i64) -> RepositoryResult<Option<Book>> {
        log::debug!("get book id={}", id);
        self.repo.find_by_id(id).await
    }

    /// Case-insensitive substring search over title, author and isbn.
    pub async fn search(
        &self,
        query: &str,
        page: Option<i64>,
        size: Option<i64>,
    ) -> RepositoryResult<Page<Book>> {
        let request = PageRequest::clamped(page, size);
        log::debug!(
            "search books query={:?} page={} size={}",
            query,
            request.page,
            request.size
        );
        self.repo.search(query, request).await
    }

    pub async fn by_category(
        &self,
        category: &str,
        page: Option<i64>,
        size: Option<i64>,
    ) -> RepositoryResult<Page<Book>> {
        let request = PageRequest::clamped(page, size);
        log::debug!(
            "books by category={:?} page={} size={}",
            category,
            request.page,
            request.size
        );
        self.repo.find_by_category(category, request).await
    }

    pub async fn health(&self) -> RepositoryResult<()> {
        self.repo.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewBook;
    use crate::storage::InMemoryBookRepository;

    async fn service_with(titles: &[&str]) -> CatalogService {
        let repo = InMemoryBookRepository::new();
        for t in titles {
            repo.insert(&NewBook {
                title: Some(t.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        }
        CatalogService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn list_clamps_bad_pagination() {
        let service = service_with(&["C", "A", "B"]).await;
        let page = service.list(Some(-1), Some(0)).await.unwrap();
        assert_eq!(page.current_page, 0);
        assert_eq!(page.total_pages, 1);
        let titles: Vec<_> = page.items.iter().filter_map(|b| b.title.as_deref()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn pages_never_exceed_size() {
        let titles: Vec<String> = (0..23).map(|i| format!("Book {i:02}")).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let service = service_with(&refs).await;

        for size in 1..=7i64 {
            let first = service.list(Some(0), Some(size)).await.unwrap();
            assert_eq!(first.total_items, 23);
            assert_eq!(first.total_pages as u64, 23u64.div_ceil(size as u64));
            let mut seen = 0;
            for p in 0..first.total_pages as i64 {
                let page = service.list(Some(p), Some(size)).await.unwrap();
                assert!(page.items.len() <= size as usize);
                seen += page.items.len();
            }
            assert_eq!(seen, 23);
        }
    }
}
