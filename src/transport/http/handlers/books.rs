use crate::domain::Book;
use crate::transport::http::types::{bad_request, internal_error, AppState, PageParams, SearchParams};
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/books",
    params(PageParams),
    responses(
        (status = 200, description = "Page of books sorted by title", body = BookPage),
        (status = 400, description = "Malformed page/size", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_books_handler(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(e) => return bad_request(e, "?page=<int>&size=<int>"),
    };

    match state.catalog.list(params.page, params.size).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => internal_error("Failed to list books", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(
        ("id" = i64, Path, description = "Book id")
    ),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 400, description = "Id is not an integer", body = ErrorBody),
        (status = 404, description = "No book with this id"),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn get_book_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let Path(id) = match id {
        Ok(v) => v,
        Err(e) => return bad_request(e, "/api/books/<int>"),
    };

    match state.catalog.get(id).await {
        Ok(Some(book)) => (StatusCode::OK, Json::<Book>(book)).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => internal_error("Failed to load book", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/books/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Books whose title, author or isbn contain the query", body = BookPage),
        (status = 400, description = "Missing query or malformed page/size", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn search_books_handler(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(e) => return bad_request(e, "?query=<text>&page=<int>&size=<int>"),
    };

    match state
        .catalog
        .search(&params.query, params.page, params.size)
        .await
    {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => internal_error("Failed to search books", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/books/category/{category}",
    params(
        ("category" = String, Path, description = "Substring of the category (case-insensitive)"),
        PageParams
    ),
    responses(
        (status = 200, description = "Books in a matching category", body = BookPage),
        (status = 400, description = "Malformed page/size", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn books_by_category_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(e) => return bad_request(e, "?page=<int>&size=<int>"),
    };

    match state
        .catalog
        .by_category(&category, params.page, params.size)
        .await
    {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => internal_error("Failed to list books by category", e),
    }
}
