// Copyright 2025 Fedboard Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP handlers for the metrics dashboard

pub mod admin;
pub mod health;
pub mod pages;
pub mod rounds;
pub mod summary;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fedboard_query::{MetricsQuery, QueryError};
use fedboard_storage::{PerformanceStore, RoundStore, StoreError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::AuthError;
use crate::cache::ClientDirectory;

pub use admin::{clear_database, insert_round, insert_sample, test_connection};
pub use health::{health_check, health_check_detailed};
pub use pages::{clients_page, dashboard_page, model_trial_page, verify_token};
pub use rounds::{get_round, latest_rounds, list_all_rounds, list_rounds_for_client};
pub use summary::{averaged_latest_round, best_f1_global, get_stats, list_clients};

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    TooManyRequests(String),

    /// Store failure; the detail is logged, never returned
    #[error("{0}")]
    Unavailable(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            ApiError::Unavailable(detail) => {
                tracing::error!(error = %detail, "Request failed on store access");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::Validation(msg) => ApiError::BadRequest(msg),
            QueryError::NotFound(msg) => ApiError::NotFound(msg),
            QueryError::Conflict(msg) => ApiError::Conflict(msg),
            QueryError::StoreUnavailable(msg) => ApiError::Unavailable(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        QueryError::from(e).into()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Forbidden(_) => ApiError::Forbidden(e.to_string()),
            _ => ApiError::Unauthenticated(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub query: MetricsQuery,
    pub performance: Arc<PerformanceStore>,
    pub clients: Arc<ClientDirectory>,
}

impl AppState {
    pub fn new(
        rounds: Arc<dyn RoundStore>,
        performance: Arc<PerformanceStore>,
        client_ids_ttl: Duration,
    ) -> Self {
        let query = MetricsQuery::new(rounds);
        let clients = Arc::new(ClientDirectory::new(query.clone(), client_ids_ttl));
        Self {
            query,
            performance,
            clients,
        }
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
