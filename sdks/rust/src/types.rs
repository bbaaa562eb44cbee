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

//! Request and response types specific to the HTTP surface.
//!
//! Domain types (rounds, metrics, summaries) come from `fedboard-core`.

use fedboard_core::Role;
use serde::{Deserialize, Serialize};

/// Direction of a per-client round listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Oldest first, for charts
    Asc,
    #[default]
    Desc,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// Options for `GET /rounds/{clientId}`.
///
/// Without `offset` or `limit` the server returns every round for the
/// client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundsQuery {
    pub order: Order,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl RoundsQuery {
    pub fn ascending() -> Self {
        Self {
            order: Order::Asc,
            ..Default::default()
        }
    }

    pub fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    pub fn is_paged(&self) -> bool {
        self.offset.is_some() || self.limit.is_some()
    }

    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("order", self.order.as_str().to_string())];
        if let Some(offset) = self.offset {
            params.push(("offset", offset.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreHealth {
    pub reachable: bool,
    pub rounds: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetailedHealth {
    pub status: String,
    pub version: String,
    pub store: StoreHealth,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionInfo {
    pub message: String,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdminAck {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClearSummary {
    pub success: bool,
    pub rounds_removed: usize,
    pub samples_removed: usize,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_query_params() {
        assert_eq!(
            RoundsQuery::default().params(),
            vec![("order", "desc".to_string())]
        );
        assert!(!RoundsQuery::ascending().is_paged());
        assert!(RoundsQuery::default().with_page(0, 50).is_paged());
        assert_eq!(
            RoundsQuery::ascending().with_page(10, 5).params(),
            vec![
                ("order", "asc".to_string()),
                ("offset", "10".to_string()),
                ("limit", "5".to_string()),
            ]
        );
    }
}
