use crate::domain::page::BookPage;
use crate::domain::Book;
use crate::transport::http::handlers::{books, health};
use crate::transport::http::types::{AppState, ErrorBody, HealthResponse};
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        books::list_books_handler,
        books::get_book_handler,
        books::search_books_handler,
        books::books_by_category_handler
    ),
    components(schemas(Book, BookPage, ErrorBody, HealthResponse))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/api/books", get(books::list_books_handler))
        .route("/api/books/search", get(books::search_books_handler))
        .route(
            "/api/books/category/:category",
            get(books::books_by_category_handler),
        )
        .route("/api/books/:id", get(books::get_book_handler))
        .with_state(app_state)
}
