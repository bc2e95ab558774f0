use crate::app::catalog_service::CatalogService;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
}

/// Pagination query string shared by every listing endpoint.
///
/// Values are signed so out-of-range input reaches the clamping policy instead of being
/// rejected by the extractor. An empty value (`?page=`) counts as absent.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Zero-based page index (default 0, negative values are treated as 0).
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<i64>,
    /// Page size (default 10, non-positive values fall back to 10, capped at 100).
    #[serde(default, deserialize_with = "blank_as_none")]
    pub size: Option<i64>,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Substring to look for in title, author or isbn (case-insensitive).
    pub query: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub size: Option<i64>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|e| serde::de::Error::custom(format!("invalid integer {:?}: {}", raw, e)))
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// 400 for a query string or path segment the extractors could not parse.
pub fn bad_request(err: impl Display, expected: &str) -> Response {
    error_response(
        StatusCode::BAD_REQUEST,
        format!("Invalid request: {} (expected: {})", err, expected),
    )
}

/// 500 with a generic message; the underlying cause is logged, not returned.
pub fn internal_error(context: &str, err: impl Display) -> Response {
    log::error!("{}: {}", context, err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
}
