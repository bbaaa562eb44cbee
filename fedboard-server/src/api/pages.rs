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

//! Session and role-gated page endpoints
//!
//! The front end calls these before rendering a protected page. The role
//! check itself runs in [`crate::auth::require_resource`].

use axum::{Extension, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::auth::AuthContext;
use fedboard_core::Role;

#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    pub message: &'static str,
    pub username: String,
    pub role: Role,
}

/// GET /auth/verify-token
pub async fn verify_token(Extension(auth): Extension<AuthContext>) -> Json<VerifyTokenResponse> {
    Json(VerifyTokenResponse {
        message: "Token is valid",
        username: auth.username,
        role: auth.role,
    })
}

/// GET /auth/dashboard
pub async fn dashboard_page(Extension(auth): Extension<AuthContext>) -> Json<Value> {
    Json(json!({ "message": format!("Welcome to the dashboard, {}", auth.username) }))
}

/// GET /auth/clients
pub async fn clients_page(Extension(auth): Extension<AuthContext>) -> Json<Value> {
    Json(json!({ "message": format!("Client overview for {}", auth.username) }))
}

/// GET /auth/modeltrial
pub async fn model_trial_page(Extension(auth): Extension<AuthContext>) -> Json<Value> {
    Json(json!({ "message": format!("Model trial access granted to {}", auth.username) }))
}
