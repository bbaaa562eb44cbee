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

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::api::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store: StoreHealth,
}

#[derive(Debug, Serialize)]
pub struct StoreHealth {
    pub reachable: bool,
    pub rounds: Option<usize>,
}

/// GET /health - liveness only
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// GET /health/detailed - liveness plus a round store probe
pub async fn health_check_detailed(State(state): State<AppState>) -> impl IntoResponse {
    debug!("Detailed health check requested");

    let rounds = match state.query.round_count() {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::error!("Health check could not reach round store: {}", e);
            None
        }
    };
    let reachable = rounds.is_some();

    let health = HealthResponse {
        status: if reachable { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        store: StoreHealth { reachable, rounds },
    };
    let status_code = if reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health))
}
