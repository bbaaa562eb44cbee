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

//! Fedboard Query Service
//!
//! Read model over the round store: ordered listings, per-client history,
//! historical aggregates, averaged latest metrics and the best global entry.
//! Every store failure leaves this crate classified as a [`QueryError`].

pub mod aggregation;
pub mod engine;
pub mod error;
pub mod order;

pub use aggregation::{Mean, MetricsAccumulator};
pub use engine::MetricsQuery;
pub use error::{QueryError, QueryResult};
pub use order::{Page, SortOrder, MAX_PAGE_LIMIT};
