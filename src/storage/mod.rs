//! Book persistence: the repository contract and its two backends.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryBookRepository;
pub use postgres::PostgresBookRepository;

use crate::domain::{Book, NewBook, Page, PageRequest};

#[derive(thiserror::Error, Debug)]
pub enum RepositoryError {
    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Other(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage capabilities the catalog needs.
///
/// Implementations must agree on ordering and matching so the HTTP layer behaves the same on
/// every backend:
/// - `find_all` orders by title bytes ascending (`COLLATE "C"`), untitled records last, ties
///   by id
/// - `search` and `find_by_category` order by id
/// - matching is a literal, case-insensitive substring test; absent fields never match
#[async_trait::async_trait]
pub trait BookRepository: Send + Sync {
    /// Persists one record and returns it with its assigned id.
    async fn insert(&self, book: &NewBook) -> RepositoryResult<Book>;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Book>>;

    async fn find_all(&self, page: PageRequest) -> RepositoryResult<Page<Book>>;

    /// Matches `term` against title, author or isbn.
    async fn search(&self, term: &str, page: PageRequest) -> RepositoryResult<Page<Book>>;

    async fn find_by_category(
        &self,
        category: &str,
        page: PageRequest,
    ) -> RepositoryResult<Page<Book>>;

    /// Liveness check against the backing store.
    async fn ping(&self) -> RepositoryResult<()>;
}
