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

//! Dashboard summary endpoints

use axum::{extract::State, Json};
use fedboard_core::{AggregateStats, AveragedLatestRound, BestRound};

use super::{ApiError, AppState};

/// GET /clients
pub async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let ids = state.clients.client_ids()?;
    Ok(Json(ids.as_ref().clone()))
}

/// GET /stats
///
/// Means over every historical `(round, client)` entry; `null` when the
/// store is empty.
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<Option<AggregateStats>>, ApiError> {
    Ok(Json(state.query.compute_aggregate()?))
}

/// GET /latest-rounds/averaged
///
/// Means over each client's most recent snapshot only.
pub async fn averaged_latest_round(
    State(state): State<AppState>,
) -> Result<Json<AveragedLatestRound>, ApiError> {
    Ok(Json(state.query.compute_averaged_latest_round()?))
}

/// GET /best-f1-global
pub async fn best_f1_global(
    State(state): State<AppState>,
) -> Result<Json<Option<BestRound>>, ApiError> {
    Ok(Json(state.query.compute_best_global_round()?))
}
