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

//! Fedboard Server
//!
//! HTTP read model for the federated-learning metrics dashboard, plus the
//! administrative endpoints used to load and reset its data.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Extension, Router,
};
use fedboard_core::Resource;
use fedboard_storage::{LogRoundStore, PerformanceStore};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{
    averaged_latest_round, best_f1_global, clear_database, clients_page, dashboard_page,
    get_round, get_stats, health_check, health_check_detailed, insert_round, insert_sample,
    latest_rounds, list_all_rounds, list_clients, list_rounds_for_client, model_trial_page,
    test_connection, verify_token, AppState,
};
use auth::{
    auth_middleware, rate_limit_middleware, require_resource, Authenticator, NoAuth,
    RateLimiter, SessionTokenAuth,
};
use config::{LoggingConfig, ServerConfig};

/// Open the round and performance stores named by the configuration
pub fn open_state(config: &ServerConfig) -> Result<AppState> {
    let uri = config.store_uri()?;
    let rounds = LogRoundStore::open_uri(&uri)
        .with_context(|| format!("opening round store at {}", uri))?;
    let performance = PerformanceStore::open_uri(&uri)
        .with_context(|| format!("opening performance store at {}", uri))?;

    tracing::info!(%uri, persistent = rounds.is_persistent(), "Stores opened");
    Ok(AppState::new(
        Arc::new(rounds),
        Arc::new(performance),
        config.client_ids_ttl(),
    ))
}

pub fn build_authenticator(config: &ServerConfig) -> Result<Arc<dyn Authenticator>> {
    if config.auth.enabled {
        let secret = config
            .auth
            .jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .context("Authentication enabled but no JWT secret configured")?;
        tracing::info!(cookie = %config.auth.cookie_name, "Session verification enabled");
        Ok(Arc::new(SessionTokenAuth::new(
            secret,
            config.auth.cookie_name.clone(),
        )))
    } else {
        tracing::warn!(
            "Authentication is DISABLED: every request is treated as an admin session. \
             Use this only for local development."
        );
        Ok(Arc::new(NoAuth))
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if !config.server.enable_cors {
        return CorsLayer::new();
    }
    if config.server.cors_origins.is_empty() {
        tracing::warn!("CORS: Allowing all origins (development mode). Set cors_origins in production!");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("CORS: ignoring invalid origin {:?}", origin);
                None
            }
        })
        .collect();
    tracing::info!("CORS: Allowing origins: {:?}", config.server.cors_origins);

    // The session cookie needs credentialed requests, which rule out wildcards
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Assemble the full application router
pub fn build_router(state: AppState, config: &ServerConfig) -> Result<Router> {
    let authenticator = build_authenticator(config)?;
    let rate_limiter = Arc::new(RateLimiter::new(&config.auth.rate_limit));

    // Dashboard read model, not session-gated
    let metrics_routes = Router::new()
        .route("/health", get(health_check))
        .route("/health/detailed", get(health_check_detailed))
        .route("/clients", get(list_clients))
        .route("/rounds", get(list_all_rounds))
        .route("/rounds/:client_id", get(list_rounds_for_client))
        .route("/round/:round_id", get(get_round))
        .route("/latest-rounds", get(latest_rounds))
        .route("/latest-rounds/averaged", get(averaged_latest_round))
        .route("/best-f1-global", get(best_f1_global))
        .route("/stats", get(get_stats));

    let page_routes = Router::new()
        .route("/auth/verify-token", get(verify_token))
        .route(
            "/auth/dashboard",
            get(dashboard_page).route_layer(axum_middleware::from_fn_with_state(
                Resource::Dashboard,
                require_resource,
            )),
        )
        .route(
            "/auth/clients",
            get(clients_page).route_layer(axum_middleware::from_fn_with_state(
                Resource::Clients,
                require_resource,
            )),
        )
        .route(
            "/auth/modeltrial",
            get(model_trial_page).route_layer(axum_middleware::from_fn_with_state(
                Resource::ModelTrial,
                require_resource,
            )),
        )
        .route_layer(axum_middleware::from_fn(auth_middleware));

    let admin_routes = Router::new()
        .route("/database/test", post(test_connection))
        .route("/database/clear", post(clear_database))
        .route("/database/rounds", post(insert_round))
        .route("/database/samples", post(insert_sample))
        .route_layer(axum_middleware::from_fn_with_state(
            Resource::DatabaseAdmin,
            require_resource,
        ))
        .route_layer(axum_middleware::from_fn(auth_middleware))
        .route_layer(axum_middleware::from_fn(rate_limit_middleware));

    Ok(Router::new()
        .merge(metrics_routes)
        .merge(page_routes)
        .merge(admin_routes)
        .fallback(api::not_found)
        .with_state(state)
        .layer(Extension(authenticator))
        .layer(Extension(rate_limiter))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http()))
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fedboard_server=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    init_tracing(&config.logging);

    tracing::info!("Starting Fedboard Server");
    tracing::debug!("Configuration: {:#?}", config);

    config.validate()?;

    let state = open_state(&config)?;
    let app = build_router(state, &config)?;

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auth_requires_secret() {
        let mut config = ServerConfig::default();
        config.auth.enabled = true;
        assert!(build_authenticator(&config).is_err());

        config.auth.jwt_secret = Some("secret".into());
        assert!(build_authenticator(&config).is_ok());
    }

    #[test]
    fn test_open_file_state() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = ServerConfig::default();
        config.storage.uri = format!("file://{}", dir.path().display());

        let state = open_state(&config).unwrap();
        assert_eq!(state.query.round_count().unwrap(), 0);
        assert!(dir.path().join(fedboard_storage::ROUNDS_LOG_FILE).exists());
        assert!(dir.path().join(fedboard_storage::PERFORMANCE_LOG_FILE).exists());
    }
}
