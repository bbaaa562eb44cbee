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

//! Sort order and pagination for round listings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{QueryError, QueryResult};

/// Largest page a caller may request
pub const MAX_PAGE_LIMIT: usize = 1000;

/// Direction of a round listing by recency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first, the order charts plot in
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(QueryError::Validation(format!(
                "order must be 'asc' or 'desc', got '{}'",
                other
            ))),
        }
    }
}

/// Offset/limit window applied after sorting.
///
/// Without a limit the window runs to the end of the listing; the default
/// page is the whole listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: Option<usize>,
}

impl Page {
    pub fn new(offset: Option<usize>, limit: Option<usize>) -> QueryResult<Self> {
        match limit {
            Some(0) => {
                return Err(QueryError::Validation("limit must be at least 1".into()));
            }
            Some(limit) if limit > MAX_PAGE_LIMIT => {
                return Err(QueryError::Validation(format!(
                    "limit must not exceed {}",
                    MAX_PAGE_LIMIT
                )));
            }
            _ => {}
        }
        Ok(Self {
            offset: offset.unwrap_or(0),
            limit,
        })
    }

    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let rest = items.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => rest.take(limit).collect(),
            None => rest.collect(),
        }
    }
}
