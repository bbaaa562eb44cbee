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

//! Session verification and role policy
//!
//! The dashboard's login service issues HS256 session tokens carrying the
//! user's name and role. They arrive in the session cookie or, for scripted
//! callers, as a `Bearer` token. Which roles may reach which resource is
//! decided only by [`fedboard_core::authorize`], applied through
//! [`require_resource`].

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use fedboard_core::{authorize, Resource, Role};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod rate_limit;
pub use rate_limit::{extract_client_ip, rate_limit_middleware, RateLimitResult, RateLimiter};

/// Verified session attached to each authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub username: String,
    pub role: Role,
}

impl AuthContext {
    /// Apply the role policy to this session
    pub fn require(&self, resource: Resource) -> Result<(), AuthError> {
        if authorize(self.role, resource).is_allowed() {
            Ok(())
        } else {
            tracing::warn!(
                username = %self.username,
                role = %self.role,
                ?resource,
                "Access denied"
            );
            Err(AuthError::Forbidden(format!(
                "role '{}' may not access this resource",
                self.role
            )))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing session token")]
    MissingCredentials,

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::MissingCredentials | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        };
        let body = serde_json::json!({ "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    pub role: Role,
    /// Expiration time (seconds since the epoch)
    pub exp: usize,
}

/// Pluggable session verification
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError>;
}

/// Verifies HS256 session tokens from the session cookie or a bearer header
pub struct SessionTokenAuth {
    key: jsonwebtoken::DecodingKey,
    cookie_name: String,
}

impl SessionTokenAuth {
    pub fn new(jwt_secret: &str, cookie_name: impl Into<String>) -> Self {
        Self {
            key: jsonwebtoken::DecodingKey::from_secret(jwt_secret.as_bytes()),
            cookie_name: cookie_name.into(),
        }
    }

    fn token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        cookie_value(headers, &self.cookie_name).or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|t| !t.is_empty())
        })
    }
}

impl Authenticator for SessionTokenAuth {
    fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let token = self.token(headers).ok_or(AuthError::MissingCredentials)?;

        let data = jsonwebtoken::decode::<Claims>(
            token,
            &self.key,
            &jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256),
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(AuthContext {
            username: data.claims.sub,
            role: data.claims.role,
        })
    }
}

/// Development authenticator: every request is an admin session
pub struct NoAuth;

impl Authenticator for NoAuth {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        Ok(AuthContext {
            username: "developer".to_string(),
            role: Role::Admin,
        })
    }
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}

/// Authentication middleware
pub async fn auth_middleware(
    Extension(auth): Extension<Arc<dyn Authenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let ctx = auth.authenticate(req.headers()).map_err(|e| {
        tracing::debug!(path = %req.uri().path(), "Authentication failed: {}", e);
        e
    })?;
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

/// Role gate for a route group; runs after [`auth_middleware`]
pub async fn require_resource(
    State(resource): State<Resource>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    req.extensions()
        .get::<AuthContext>()
        .ok_or(AuthError::MissingCredentials)?
        .require(resource)?;
    Ok(next.run(req).await)
}
