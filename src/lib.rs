pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::catalog_service::CatalogService;
pub use app::csv_import::{run_import, ImportOutcome, ImportSettings, ImportSummary};
pub use domain::{Book, NewBook, Page, PageRequest};
pub use storage::{BookRepository, InMemoryBookRepository, PostgresBookRepository};
