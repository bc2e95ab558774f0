//! Catalog domain types.

pub mod book;
pub mod page;

pub use book::{Book, NewBook};
pub use page::{Page, PageRequest};
