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

//! Per-client rate limiting for administrative routes
//!
//! One token bucket per client IP, held in a bounded `moka` cache so that
//! idle clients are evicted on their own.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use moka::sync::Cache;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::api::ApiError;
use crate::config::RateLimitConfig;

const MAX_TRACKED_CLIENTS: u64 = 100_000;

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug)]
struct TokenBucket {
    capacity: f64,
    /// Tokens added per second
    refill_rate: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity: capacity as f64,
            refill_rate: capacity as f64 / window.as_secs_f64(),
            state: Mutex::new(BucketState {
                tokens: capacity as f64,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Take one token, or report how long until one is available
    fn take(&self) -> Result<u32, Duration> {
        let mut state = self.state.lock();
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_rate).min(self.capacity);
        state.last_refill = now;

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            Ok(state.tokens.floor() as u32)
        } else {
            Err(Duration::from_secs_f64(
                (1.0 - state.tokens) / self.refill_rate,
            ))
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum RateLimitResult {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

pub struct RateLimiter {
    enabled: bool,
    max_requests: u32,
    window: Duration,
    buckets: Cache<String, Arc<TokenBucket>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let window = Duration::from_secs(config.window_secs.max(1));
        let buckets = Cache::builder()
            .max_capacity(MAX_TRACKED_CLIENTS)
            .time_to_idle(window * 10)
            .build();

        Self {
            enabled: config.enabled,
            max_requests: config.max_requests,
            window,
            buckets,
        }
    }

    pub fn check(&self, client: &str) -> RateLimitResult {
        if !self.enabled {
            return RateLimitResult::Allowed {
                remaining: self.max_requests,
            };
        }

        let bucket = self.buckets.get_with(client.to_string(), || {
            Arc::new(TokenBucket::new(self.max_requests, self.window))
        });
        match bucket.take() {
            Ok(remaining) => RateLimitResult::Allowed { remaining },
            Err(retry_after) => RateLimitResult::Limited { retry_after },
        }
    }
}

/// Client IP as reported by the fronting proxy
pub fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    forwarded
        .or_else(|| {
            headers
                .get("X-Real-IP")
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
        })
        .map(str::to_string)
}

pub async fn rate_limit_middleware(
    Extension(limiter): Extension<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let client = extract_client_ip(req.headers()).unwrap_or_else(|| "unknown".to_string());

    match limiter.check(&client) {
        RateLimitResult::Allowed { remaining } => {
            let mut response = next.run(req).await;
            response
                .headers_mut()
                .insert("X-RateLimit-Remaining", HeaderValue::from(remaining));
            response
        }
        RateLimitResult::Limited { retry_after } => {
            let secs = retry_after.as_secs().max(1);
            tracing::warn!(client = %client, retry_after = secs, "Rate limit exceeded");

            let mut response = ApiError::TooManyRequests(format!(
                "Rate limit exceeded. Try again in {} seconds.",
                secs
            ))
            .into_response();
            let headers = response.headers_mut();
            headers.insert("X-RateLimit-Remaining", HeaderValue::from(0u32));
            headers.insert("Retry-After", HeaderValue::from(secs));
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64, enabled: bool) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            enabled,
            max_requests,
            window_secs,
        })
    }

    #[test]
    fn test_bucket_drains_then_limits() {
        let limiter = limiter(3, 60, true);
        for expected in [2, 1, 0] {
            assert_eq!(
                limiter.check("10.0.0.1"),
                RateLimitResult::Allowed {
                    remaining: expected
                }
            );
        }
        assert!(matches!(
            limiter.check("10.0.0.1"),
            RateLimitResult::Limited { .. }
        ));

        // other clients have their own bucket
        assert!(matches!(
            limiter.check("10.0.0.2"),
            RateLimitResult::Allowed { .. }
        ));
    }

    #[test]
    fn test_bucket_refills() {
        let bucket = TokenBucket::new(10, Duration::from_secs(1));
        for _ in 0..10 {
            assert!(bucket.take().is_ok());
        }
        assert!(bucket.take().is_err());

        std::thread::sleep(Duration::from_millis(150));
        assert!(bucket.take().is_ok());
    }

    #[test]
    fn test_disabled_never_limits() {
        let limiter = limiter(1, 60, false);
        for _ in 0..10 {
            assert!(matches!(
                limiter.check("10.0.0.1"),
                RateLimitResult::Allowed { remaining: 1 }
            ));
        }
    }

    #[test]
    fn test_extract_client_ip() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_client_ip(&headers), None);

        headers.insert("X-Real-IP", "192.168.1.9".parse().unwrap());
        assert_eq!(extract_client_ip(&headers).as_deref(), Some("192.168.1.9"));

        headers.insert("X-Forwarded-For", "203.0.113.5, 10.0.0.1".parse().unwrap());
        assert_eq!(extract_client_ip(&headers).as_deref(), Some("203.0.113.5"));
    }
}
