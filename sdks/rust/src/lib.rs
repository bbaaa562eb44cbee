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

//! # Fedboard SDK for Rust
//!
//! Async client for the fedboard federated-learning metrics API, plus the
//! fetch-state plumbing a dashboard needs around it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fedboard_client::{ClientConfig, MetricsClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MetricsClient::new(ClientConfig::new("http://localhost:8000"))?;
//!
//!     match client.best_f1_global().await? {
//!         Some(best) => println!("best F1 {:.3} ({} in {})", best.metrics.f1_score, best.client_id, best.round),
//!         None => println!("no rounds yet"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Following a selected client
//!
//! ```no_run
//! use fedboard_client::{ClientConfig, MetricsClient, RoundsQuery, SelectionFeed};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MetricsClient::new(ClientConfig::new("http://localhost:8000"))?;
//! let mut feed = SelectionFeed::new();
//!
//! let ticket = feed.select("clinic-a".to_string());
//! let result = client.rounds_for_client(ticket.key(), &RoundsQuery::default()).await;
//! feed.settle(ticket, result);
//!
//! if let Some(rounds) = feed.data() {
//!     println!("{} rounds", rounds.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod feed;
pub mod types;

pub use client::{error_for_status, ClientConfig, ClientError, MetricsClient, Result};
pub use feed::{most_recent, Emptiness, FetchState, SelectionFeed, Ticket};
pub use types::*;

pub use fedboard_core::{
    AggregateStats, AveragedLatestRound, AveragedMetrics, BestRound, ClientMetrics, Metrics,
    NewTrainingRound, PerformanceSample, Role, TrainingRound,
};
