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

//! Round listing endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use fedboard_core::TrainingRound;
use fedboard_query::{Page, SortOrder};
use serde::Deserialize;
use tracing::debug;

use super::{ApiError, AppState};

/// Query parameters for `GET /rounds/:client_id`.
///
/// Kept as raw strings so malformed values become a JSON 400.
#[derive(Debug, Default, Deserialize)]
pub struct ClientRoundsParams {
    pub order: Option<String>,
    pub offset: Option<String>,
    pub limit: Option<String>,
}

impl ClientRoundsParams {
    fn order(&self) -> Result<SortOrder, ApiError> {
        match self.order.as_deref() {
            None => Ok(SortOrder::default()),
            Some(raw) => Ok(raw.parse()?),
        }
    }

    /// `None` when neither `offset` nor `limit` was sent
    fn page(&self) -> Result<Option<Page>, ApiError> {
        let offset = parse_count("offset", self.offset.as_deref())?;
        let limit = parse_count("limit", self.limit.as_deref())?;
        if offset.is_none() && limit.is_none() {
            return Ok(None);
        }
        Ok(Some(Page::new(offset, limit)?))
    }
}

fn parse_count(name: &str, raw: Option<&str>) -> Result<Option<usize>, ApiError> {
    raw.map(|value| {
        value.parse::<usize>().map_err(|_| {
            ApiError::BadRequest(format!("{} must be a non-negative integer", name))
        })
    })
    .transpose()
}

/// GET /rounds
pub async fn list_all_rounds(
    State(state): State<AppState>,
) -> Result<Json<Vec<TrainingRound>>, ApiError> {
    Ok(Json(state.query.list_all_rounds()?))
}

/// GET /rounds/:client_id?order=asc|desc&offset=&limit=
pub async fn list_rounds_for_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Query(params): Query<ClientRoundsParams>,
) -> Result<Json<Vec<TrainingRound>>, ApiError> {
    let order = params.order()?;
    let rounds = match params.page()? {
        Some(page) => {
            debug!(%client_id, %order, offset = page.offset, limit = ?page.limit, "Rounds for client, paged");
            state
                .query
                .list_rounds_for_client_page(&client_id, order, page)?
        }
        None => state.query.list_rounds_for_client(&client_id, order)?,
    };
    Ok(Json(rounds))
}

/// GET /round/:round_id
pub async fn get_round(
    State(state): State<AppState>,
    Path(round_id): Path<String>,
) -> Result<Json<TrainingRound>, ApiError> {
    Ok(Json(state.query.get_round(&round_id)?))
}

/// GET /latest-rounds
pub async fn latest_rounds(
    State(state): State<AppState>,
) -> Result<Json<Vec<TrainingRound>>, ApiError> {
    Ok(Json(state.query.latest_rounds()?))
}
