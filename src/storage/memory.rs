//! In-process book repository with the same semantics as the Postgres backend.

use crate::domain::book::DESCRIPTION_MAX_LEN;
use crate::domain::{Book, NewBook, Page, PageRequest};
use crate::storage::{BookRepository, RepositoryError, RepositoryResult};
use std::cmp::Ordering;
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    next_id: i64,
    books: Vec<Book>,
}

/// Records are kept in insertion (= id) order.
#[derive(Default)]
pub struct InMemoryBookRepository {
    state: RwLock<State>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.books.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of every stored record in id order.
    pub async fn all(&self) -> Vec<Book> {
        self.state.read().await.books.clone()
    }

    async fn filtered_page(
        &self,
        page: PageRequest,
        keep: impl Fn(&Book) -> bool,
    ) -> Page<Book> {
        let state = self.state.read().await;
        let matching: Vec<Book> = state.books.iter().filter(|b| keep(*b)).cloned().collect();
        Page::from_ordered(matching, page)
    }
}

#[async_trait::async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn insert(&self, book: &NewBook) -> RepositoryResult<Book> {
        if let Some(description) = &book.description {
            let len = description.chars().count();
            if len > DESCRIPTION_MAX_LEN {
                return Err(RepositoryError::Other(format!(
                    "description is {len} characters, limit is {DESCRIPTION_MAX_LEN}"
                )));
            }
        }

        let mut state = self.state.write().await;
        state.next_id += 1;
        let stored = book.clone().with_id(state.next_id);
        state.books.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Book>> {
        let state = self.state.read().await;
        Ok(state.books.iter().find(|b| b.id == id).cloned())
    }

    async fn find_all(&self, page: PageRequest) -> RepositoryResult<Page<Book>> {
        let mut all = self.all().await;
        all.sort_by(by_title_then_id);
        Ok(Page::from_ordered(all, page))
    }

    async fn search(&self, term: &str, page: PageRequest) -> RepositoryResult<Page<Book>> {
        let needle = term.to_lowercase();
        Ok(self.filtered_page(page, |b| b.matches_text(&needle)).await)
    }

    async fn find_by_category(
        &self,
        category: &str,
        page: PageRequest,
    ) -> RepositoryResult<Page<Book>> {
        let needle = category.to_lowercase();
        Ok(self
            .filtered_page(page, |b| b.matches_category(&needle))
            .await)
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

// Byte-wise title comparison, the same order as `COLLATE "C"`. Untitled records sort after
// every titled one, mirroring `NULLS LAST`.
fn by_title_then_id(a: &Book, b: &Book) -> Ordering {
    let title_order = match (&a.title, &b.title) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    title_order.then(a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: Option<&str>) -> NewBook {
        NewBook {
            title: title.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let repo = InMemoryBookRepository::new();
        let a = repo.insert(&titled(Some("A"))).await.unwrap();
        let b = repo.insert(&titled(Some("B"))).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(repo.find_by_id(2).await.unwrap(), Some(b));
        assert_eq!(repo.find_by_id(3).await.unwrap(), None);
    }

    #[tokio::test]
    async fn find_all_sorts_untitled_last() {
        let repo = InMemoryBookRepository::new();
        for t in [None, Some("Zen"), Some("Alpha"), None, Some("Alpha")] {
            repo.insert(&titled(t)).await.unwrap();
        }
        let page = repo.find_all(PageRequest::default()).await.unwrap();
        let ids: Vec<i64> = page.items.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![3, 5, 2, 1, 4]);
    }

    #[tokio::test]
    async fn find_all_orders_titles_bytewise() {
        let repo = InMemoryBookRepository::new();
        for t in ["apple", "Zebra", "Mango", "\u{c9}clair"] {
            repo.insert(&titled(Some(t))).await.unwrap();
        }
        let page = repo.find_all(PageRequest::default()).await.unwrap();
        let titles: Vec<_> = page.items.iter().filter_map(|b| b.title.as_deref()).collect();
        assert_eq!(titles, vec!["Mango", "Zebra", "apple", "\u{c9}clair"]);
    }

    #[tokio::test]
    async fn rejects_oversized_description() {
        let repo = InMemoryBookRepository::new();
        let book = NewBook {
            description: Some("x".repeat(DESCRIPTION_MAX_LEN + 1)),
            ..Default::default()
        };
        assert!(matches!(
            repo.insert(&book).await,
            Err(RepositoryError::Other(_))
        ));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn wildcard_characters_match_literally() {
        let repo = InMemoryBookRepository::new();
        repo.insert(&titled(Some("100% Cotton"))).await.unwrap();
        repo.insert(&titled(Some("1000 Cottons"))).await.unwrap();
        let page = repo.search("0%", PageRequest::default()).await.unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].title.as_deref(), Some("100% Cotton"));
    }
}
