use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::{config::AppConfig, errors::ServiceError, ApiResponse};

/// Result of a handler that creates a resource
pub type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ServiceError>;

/// Standard created response
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

/// Standard success response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// Pagination parameters for list operations
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// 1-based page number
    pub page: Option<u64>,
    /// Clamped to the configured maximum
    pub per_page: Option<u64>,
}

impl PaginationParams {
    /// Page and page size after applying the configured defaults and bounds
    pub fn resolve(&self, config: &AppConfig) -> (u64, u64) {
        (self.page.unwrap_or(1).max(1), config.page_size(self.per_page))
    }
}
