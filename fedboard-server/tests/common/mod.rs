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

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use fedboard_core::{ClientMetrics, Metrics, NewTrainingRound, Role};
use fedboard_server::{api::AppState, auth::Claims, build_router, config::ServerConfig, open_state};
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

pub fn memory_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.storage.uri = "memory://".to_string();
    config
}

pub fn auth_config() -> ServerConfig {
    let mut config = memory_config();
    config.auth.enabled = true;
    config.auth.jwt_secret = Some(SECRET.to_string());
    config
}

pub fn app_with(config: &ServerConfig) -> (Router, AppState) {
    let state = open_state(config).unwrap();
    let app = build_router(state.clone(), config).unwrap();
    (app, state)
}

pub fn app() -> (Router, AppState) {
    app_with(&memory_config())
}

/// r1 at t=1 with c1; r2 at t=2 with c1 and c2
pub fn seed_scenario(state: &AppState) {
    let rounds = [
        (
            "r1",
            1,
            vec![ClientMetrics::new("c1", Metrics::basic(0.8, 0.75, 0.3))],
        ),
        (
            "r2",
            2,
            vec![
                ClientMetrics::new("c1", Metrics::basic(0.85, 0.8, 0.25)),
                ClientMetrics::new("c2", Metrics::basic(0.6, 0.55, 0.5)),
            ],
        ),
    ];
    for (id, secs, clients) in rounds {
        state
            .query
            .insert_round_at(
                NewTrainingRound::new(id, clients),
                Utc.timestamp_opt(secs, 0).unwrap(),
            )
            .unwrap();
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn session_token(role: Role) -> String {
    let claims = Claims {
        sub: "alice".to_string(),
        role,
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn with_session(mut req: Request<Body>, role: Role) -> Request<Body> {
    let cookie = format!("session_token={}", session_token(role));
    req.headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    req
}

/// Send a request and decode the JSON body (`Null` when empty)
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn round_ids(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|r| r["round_id"].as_str().unwrap().to_string())
        .collect()
}
