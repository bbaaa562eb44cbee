// Copyright 2025 Sushanth (https://github.com/sushanthpy)
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

//! Prints a text dashboard for a running fedboard server.
//!
//! ```text
//! cargo run -p fedboard-client --example dashboard -- http://localhost:8000
//! ```

use fedboard_client::{
    most_recent, ClientConfig, FetchState, MetricsClient, Order, RoundsQuery, SelectionFeed,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8000".to_string());
    let client = MetricsClient::new(ClientConfig::new(url))?;

    let health = client.health_detailed().await?;
    println!("server {} ({})", health.version, health.status);

    match client.stats().await? {
        Some(stats) => println!(
            "{} rounds, mean accuracy {:.3}, mean F1 {:.3}, mean loss {:.3}",
            stats.total_rounds, stats.avg_accuracy, stats.avg_f1_score, stats.avg_loss
        ),
        None => {
            println!("no rounds recorded yet");
            return Ok(());
        }
    }

    let averaged = client.averaged_latest_round().await?;
    if let Some(metrics) = averaged.averaged_metrics {
        println!(
            "latest across {} clients: accuracy {:.3}, F1 {:.3}",
            averaged.client_count, metrics.accuracy, metrics.f1_score
        );
    }

    let mut feed = SelectionFeed::new();
    for client_id in client.list_clients().await? {
        let ticket = feed.select(client_id.clone());
        let result = client
            .rounds_for_client(ticket.key(), &RoundsQuery::default())
            .await;
        feed.settle(ticket, result);

        match feed.state() {
            FetchState::Ready(rounds) => {
                println!("{} ({} rounds)", client_id, rounds.len());
                for round in most_recent(rounds, Order::Desc, 3) {
                    if let Some(entry) = round.client(&client_id) {
                        println!(
                            "  {}  acc {:.3}  f1 {:.3}  loss {:.3}",
                            round.round_id,
                            entry.metrics.accuracy,
                            entry.metrics.f1_score,
                            entry.metrics.loss
                        );
                    }
                }
            }
            FetchState::Failed { message, .. } => println!("{}: {}", client_id, message),
            _ => println!("{}: no rounds", client_id),
        }
    }

    Ok(())
}
