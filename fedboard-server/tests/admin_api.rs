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

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

fn round_payload(id: &str, clients: &[(&str, f64)]) -> serde_json::Value {
    json!({
        "round_id": id,
        "clients": clients
            .iter()
            .map(|(client, accuracy)| json!({
                "client_id": client,
                "metrics": { "accuracy": accuracy, "f1_score": 0.7, "loss": 0.4 }
            }))
            .collect::<Vec<_>>(),
    })
}

fn sample_payload(round: u32) -> serde_json::Value {
    json!({
        "round": round,
        "accuracy": 0.91,
        "f1Score": 0.88,
        "loss": 0.21,
        "precision": 0.9,
        "recall": 0.86
    })
}

#[tokio::test]
async fn test_ingest_round() {
    let (app, _) = app();

    // prime the client cache so ingestion has to invalidate it
    let (_, body) = send(&app, get("/clients")).await;
    assert_eq!(body, json!([]));

    let (status, body) = send(
        &app,
        post_json("/database/rounds", &round_payload("r1", &[("c1", 0.8), ("c2", 0.7)])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["round_id"], "r1");
    assert!(body["created_at"].is_string());

    let (_, body) = send(&app, get("/clients")).await;
    assert_eq!(body, json!(["c1", "c2"]));
}

#[tokio::test]
async fn test_ingest_conflict_and_validation() {
    let (app, _) = app();
    let original = round_payload("r1", &[("c1", 0.8)]);
    let (status, _) = send(&app, post_json("/database/rounds", &original)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        post_json("/database/rounds", &round_payload("r1", &[("c9", 0.1)])),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].is_string());

    let (_, stored) = send(&app, get("/round/r1")).await;
    assert_eq!(stored["clients"][0]["client_id"], "c1");

    let invalid = [
        round_payload("r2", &[("c1", 0.8), ("c1", 0.7)]),
        round_payload("", &[("c1", 0.8)]),
        round_payload("r2", &[("", 0.8)]),
        round_payload("r2", &[("c1", 1.2)]),
        round_payload("r2", &[]),
        json!({ "round_id": "r2" }),
    ];
    for payload in invalid {
        let (status, body) = send(&app, post_json("/database/rounds", &payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", payload);
        assert!(body["message"].is_string(), "{}", payload);
    }

    let (_, body) = send(&app, get("/rounds")).await;
    assert_eq!(round_ids(&body), vec!["r1"]);
}

#[tokio::test]
async fn test_clear_empties_everything() {
    let (app, state) = app();
    seed_scenario(&state);
    let (status, _) = send(&app, post_json("/database/samples", &sample_payload(1))).await;
    assert_eq!(status, StatusCode::CREATED);

    // cache the client list before clearing
    let (_, body) = send(&app, get("/clients")).await;
    assert_eq!(body, json!(["c1", "c2"]));

    let (status, body) = send(&app, post_json("/database/clear", &json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": true, "rounds_removed": 2, "samples_removed": 1 })
    );
    assert_eq!(state.performance.count(), 0);

    for uri in ["/rounds", "/clients", "/latest-rounds", "/rounds/c1"] {
        let (_, body) = send(&app, get(uri)).await;
        assert_eq!(body, json!([]), "{}", uri);
    }
    let (_, body) = send(&app, get("/stats")).await;
    assert!(body.is_null());
}

#[tokio::test]
async fn test_invalid_sample_rejected() {
    let (app, state) = app();
    let mut sample = sample_payload(1);
    sample["recall"] = json!(3.5);

    let (status, _) = send(&app, post_json("/database/samples", &sample)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(state.performance.count(), 0);
}

#[tokio::test]
async fn test_connection_probe() {
    let (app, _) = app();
    let dir = tempfile::TempDir::new().unwrap();

    let ok = [
        "memory://".to_string(),
        format!("file://{}", dir.path().display()),
    ];
    for uri in ok {
        let (status, body) = send(&app, post_json("/database/test", &json!({ "uri": uri }))).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body["success"], true);
    }

    let bad = [
        json!({ "uri": format!("file://{}/missing", dir.path().display()) }),
        json!({ "uri": "mongodb://localhost:27017/fedboard" }),
        json!({ "uri": "" }),
        json!({}),
    ];
    for payload in bad {
        let (status, body) = send(&app, post_json("/database/test", &payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", payload);
        assert!(body["message"].is_string(), "{}", payload);
    }
}

#[tokio::test]
async fn test_admin_routes_are_rate_limited() {
    let mut config = memory_config();
    config.auth.rate_limit.max_requests = 2;
    let (app, _) = app_with(&config);

    let probe = || {
        let mut req = post_json("/database/test", &json!({ "uri": "memory://" }));
        req.headers_mut()
            .insert("X-Forwarded-For", "198.51.100.7".parse().unwrap());
        req
    };

    for _ in 0..2 {
        let (status, _) = send(&app, probe()).await;
        assert_eq!(status, StatusCode::OK);
    }

    let response = {
        use tower::ServiceExt;
        app.clone().oneshot(probe()).await.unwrap()
    };
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("Retry-After"));

    // read routes are not limited
    for _ in 0..5 {
        let (status, _) = send(&app, get("/rounds")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
