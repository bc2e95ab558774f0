//! The book record, the only entity in the catalog.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Upper bound on `description`, enforced by the `VARCHAR(1000)` column.
pub const DESCRIPTION_MAX_LEN: usize = 1000;

/// A persisted book. `id` is assigned by the store and never changes.
///
/// None of the business fields are mandatory: imported catalogs are routinely incomplete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub language: Option<String>,
    pub page_count: Option<i32>,
    pub category: Option<String>,
    pub stock_quantity: Option<i32>,
    pub average_rating: Option<f64>,
    pub ratings_count: Option<i32>,
}

/// A book that has not been persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub language: Option<String>,
    pub page_count: Option<i32>,
    pub category: Option<String>,
    pub stock_quantity: Option<i32>,
    pub average_rating: Option<f64>,
    pub ratings_count: Option<i32>,
}

impl NewBook {
    /// Attaches the store-assigned identifier.
    pub fn with_id(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            description: self.description,
            image_url: self.image_url,
            price: self.price,
            publication_year: self.publication_year,
            publisher: self.publisher,
            language: self.language,
            page_count: self.page_count,
            category: self.category,
            stock_quantity: self.stock_quantity,
            average_rating: self.average_rating,
            ratings_count: self.ratings_count,
        }
    }
}

impl Book {
    /// True if `title`, `author` or `isbn` contains `needle`.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_text(&self, needle: &str) -> bool {
        [&self.title, &self.author, &self.isbn]
            .into_iter()
            .any(|field| contains_ignore_case(field.as_deref(), needle))
    }

    /// True if `category` contains `needle` (already lowercased).
    pub fn matches_category(&self, needle: &str) -> bool {
        contains_ignore_case(self.category.as_deref(), needle)
    }
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, author: &str, isbn: Option<&str>, category: Option<&str>) -> Book {
        NewBook {
            title: Some(title.to_string()),
            author: Some(author.to_string()),
            isbn: isbn.map(str::to_string),
            category: category.map(str::to_string),
            ..Default::default()
        }
        .with_id(1)
    }

    #[test]
    fn text_match_covers_title_author_and_isbn() {
        let b = book("Dune", "Frank Herbert", Some("0441172717"), None);
        assert!(b.matches_text("dune"));
        assert!(b.matches_text("herb"));
        assert!(b.matches_text("17271"));
        assert!(!b.matches_text("asimov"));
    }

    #[test]
    fn category_match_is_substring() {
        let b = book("Dune", "Frank Herbert", None, Some("Science Fiction"));
        for term in ["sci", "fiction", "science fiction"] {
            assert!(b.matches_category(term), "{term}");
        }
        assert!(!b.matches_category("fantasy"));
    }

    #[test]
    fn absent_fields_never_match() {
        let b = NewBook::default().with_id(7);
        assert!(!b.matches_text(""));
        assert!(!b.matches_category(""));
    }

    #[test]
    fn serializes_camel_case_with_numeric_price() {
        let mut b = book("Dune", "Frank Herbert", None, None);
        b.price = Some(Decimal::new(1299, 2));
        b.image_url = Some("http://img".to_string());
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["imageUrl"], "http://img");
        assert_eq!(json["price"], 12.99);
        assert!(json["publicationYear"].is_null());
    }
}
