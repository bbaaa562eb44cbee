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

use axum::http::{header, StatusCode};
use common::*;
use fedboard_core::Role;
use serde_json::json;

#[tokio::test]
async fn test_verify_token() {
    let (app, _) = app_with(&auth_config());

    let (status, body) = send(&app, get("/auth/verify-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());

    let (status, body) = send(&app, with_session(get("/auth/verify-token"), Role::Clinic)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "clinic");
}

#[tokio::test]
async fn test_garbage_token_is_unauthenticated() {
    let (app, _) = app_with(&auth_config());
    let mut req = get("/auth/dashboard");
    req.headers_mut()
        .insert(header::COOKIE, "session_token=not.a.jwt".parse().unwrap());

    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_role_pages() {
    let (app, _) = app_with(&auth_config());

    let cases = [
        ("/auth/dashboard", Role::Admin, StatusCode::OK),
        ("/auth/dashboard", Role::Clinic, StatusCode::FORBIDDEN),
        ("/auth/clients", Role::Admin, StatusCode::OK),
        ("/auth/clients", Role::Client, StatusCode::FORBIDDEN),
        ("/auth/modeltrial", Role::Clinic, StatusCode::OK),
        ("/auth/modeltrial", Role::Admin, StatusCode::FORBIDDEN),
    ];
    for (uri, role, expected) in cases {
        let (status, body) = send(&app, with_session(get(uri), role)).await;
        assert_eq!(status, expected, "{} as {}", uri, role);
        assert!(body["message"].is_string(), "{} as {}", uri, role);
    }
}

#[tokio::test]
async fn test_admin_routes_need_admin_session() {
    let (app, _) = app_with(&auth_config());
    let body = json!({ "uri": "memory://" });

    let (status, _) = send(&app, post_json("/database/test", &body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        with_session(post_json("/database/clear", &json!({})), Role::Clinic),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        with_session(post_json("/database/test", &body), Role::Admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let mut bearer = post_json("/database/test", &body);
    bearer.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", session_token(Role::Admin)).parse().unwrap(),
    );
    let (status, _) = send(&app, bearer).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_reads_are_open_when_auth_enabled() {
    let (app, state) = app_with(&auth_config());
    seed_scenario(&state);

    let (status, body) = send(&app, get("/rounds/c1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(round_ids(&body), vec!["r2", "r1"]);
}

#[tokio::test]
async fn test_development_mode_is_admin() {
    let (app, _) = app();

    let (status, body) = send(&app, get("/auth/verify-token")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");

    let (status, _) = send(&app, get("/auth/dashboard")).await;
    assert_eq!(status, StatusCode::OK);
}
