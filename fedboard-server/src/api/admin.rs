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

//! Administrative endpoints
//!
//! Mounted behind session verification, the `DatabaseAdmin` role gate and
//! the per-IP rate limiter.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use fedboard_core::{NewTrainingRound, PerformanceSample, TrainingRound};
use fedboard_storage::StoreUri;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiError, AppState};
use crate::auth::AuthContext;

#[derive(Debug, Deserialize)]
pub struct ConnectionTestRequest {
    pub uri: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub rounds_removed: usize,
    pub samples_removed: usize,
}

/// POST /database/test
///
/// Parses a store URI and checks that it could be opened. Any failure is a
/// 400 so the settings page can show it next to the input.
pub async fn test_connection(
    payload: Result<Json<ConnectionTestRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(request) = payload?;

    let uri: StoreUri = request
        .uri
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Connection failed: {}", e)))?;
    uri.probe()
        .map_err(|e| ApiError::BadRequest(format!("Connection failed: {}", e)))?;

    info!(%uri, "Store connection test succeeded");
    Ok(Json(SuccessResponse {
        success: true,
        message: "Connection successful".to_string(),
    }))
}

/// POST /database/clear
///
/// Empties the performance samples and then the training rounds. Each clear
/// is all-or-nothing; a failure is reported without a partial result.
pub async fn clear_database(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ClearResponse>, ApiError> {
    let samples_removed = state.performance.clear()?;
    let rounds_removed = state.query.clear_rounds()?;
    state.clients.invalidate();

    info!(
        username = %auth.username,
        rounds_removed,
        samples_removed,
        "Database cleared"
    );
    Ok(Json(ClearResponse {
        success: true,
        rounds_removed,
        samples_removed,
    }))
}

/// POST /database/rounds
pub async fn insert_round(
    State(state): State<AppState>,
    payload: Result<Json<NewTrainingRound>, JsonRejection>,
) -> Result<(StatusCode, Json<TrainingRound>), ApiError> {
    let Json(round) = payload?;
    let round = state.query.insert_round(round)?;
    state.clients.invalidate();
    Ok((StatusCode::CREATED, Json(round)))
}

/// POST /database/samples
pub async fn insert_sample(
    State(state): State<AppState>,
    payload: Result<Json<PerformanceSample>, JsonRejection>,
) -> Result<(StatusCode, Json<SuccessResponse>), ApiError> {
    let Json(sample) = payload?;
    let round = sample.round;
    state.performance.insert(sample)?;
    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse {
            success: true,
            message: format!("Performance sample for round {} recorded", round),
        }),
    ))
}
