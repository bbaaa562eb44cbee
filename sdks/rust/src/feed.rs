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

//! Selection-keyed fetch state for dashboard views.
//!
//! A view selects a key (usually a client id), fetches, and settles the
//! result. Every selection or refetch bumps a generation; a response that
//! settles under an older ticket is dropped so a slow request for a
//! previously selected client never overwrites the current one.

use crate::client::ClientError;
use crate::types::Order;
use fedboard_core::{AveragedLatestRound, TrainingRound};

/// What a view should render
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    /// Nothing selected yet
    Idle,
    Loading,
    /// The request succeeded but there is nothing to show
    Empty,
    Ready(T),
    Failed { message: String, retryable: bool },
}

impl<T> FetchState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Responses that can legitimately carry no data
pub trait Emptiness {
    fn is_empty(&self) -> bool;
}

impl<T> Emptiness for Vec<T> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl<T> Emptiness for Option<T> {
    fn is_empty(&self) -> bool {
        self.is_none()
    }
}

impl Emptiness for AveragedLatestRound {
    fn is_empty(&self) -> bool {
        self.client_count == 0
    }
}

/// Proof of which selection a request was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    key: K,
    generation: u64,
}

impl<K> Ticket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

pub struct SelectionFeed<K, T> {
    selected: Option<K>,
    generation: u64,
    state: FetchState<T>,
}

impl<K, T> Default for SelectionFeed<K, T> {
    fn default() -> Self {
        Self {
            selected: None,
            generation: 0,
            state: FetchState::Idle,
        }
    }
}

impl<K: Clone + PartialEq, T: Emptiness> SelectionFeed<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `key` and start loading it
    pub fn select(&mut self, key: K) -> Ticket<K> {
        self.selected = Some(key.clone());
        self.issue(key)
    }

    /// Reload the current selection, if any
    pub fn refetch(&mut self) -> Option<Ticket<K>> {
        let key = self.selected.clone()?;
        Some(self.issue(key))
    }

    fn issue(&mut self, key: K) -> Ticket<K> {
        self.generation += 1;
        self.state = FetchState::Loading;
        Ticket {
            key,
            generation: self.generation,
        }
    }

    /// Apply a response. Returns false when the ticket is stale and the
    /// response was dropped.
    pub fn settle(&mut self, ticket: Ticket<K>, result: Result<T, ClientError>) -> bool {
        if ticket.generation != self.generation || self.selected.as_ref() != Some(&ticket.key) {
            tracing::debug!(
                generation = ticket.generation,
                current = self.generation,
                "Dropping stale response"
            );
            return false;
        }

        self.state = match result {
            Ok(data) if data.is_empty() => FetchState::Empty,
            Ok(data) => FetchState::Ready(data),
            // A missing client or round renders as "no data yet"
            Err(ClientError::NotFound(_)) => FetchState::Empty,
            Err(e) => FetchState::Failed {
                retryable: e.is_retryable(),
                message: e.to_string(),
            },
        };
        true
    }

    pub fn selected(&self) -> Option<&K> {
        self.selected.as_ref()
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn data(&self) -> Option<&T> {
        self.state.data()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }
}

/// The `n` most recent rounds of a listing fetched in `order`, kept in that
/// order. Compact views use this; "see all" views use the full listing.
pub fn most_recent(rounds: &[TrainingRound], order: Order, n: usize) -> &[TrainingRound] {
    let n = n.min(rounds.len());
    match order {
        Order::Desc => &rounds[..n],
        Order::Asc => &rounds[rounds.len() - n..],
    }
}
