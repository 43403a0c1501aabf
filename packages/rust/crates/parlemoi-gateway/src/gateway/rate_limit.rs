//! Per-client fixed-window rate limiting, applied to every route.
//!
//! Clients are keyed by peer IP (`ConnectInfo`); requests without a peer address
//! share one bucket.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::error::ApiError;
use super::state::GatewayState;

/// Windows are swept for expiry once this many clients are tracked.
const PRUNE_THRESHOLD: usize = 4096;

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    started: Instant,
    count: u32,
}

/// Outcome of one rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after: Duration },
}

/// Shared limiter: at most `max_requests` per client per `window`. Cheap to clone.
#[derive(Clone)]
pub struct RateLimiter {
    clients: Arc<Mutex<HashMap<Option<IpAddr>, ClientWindow>>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    /// `max_requests == 0` disables limiting.
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window: window.max(Duration::from_secs(1)),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.max_requests > 0
    }

    /// Count one request for `client` and decide whether it may proceed.
    pub fn check(&self, client: Option<IpAddr>) -> RateDecision {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: Option<IpAddr>, now: Instant) -> RateDecision {
        if !self.is_enabled() {
            return RateDecision::Allowed;
        }
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        if clients.len() >= PRUNE_THRESHOLD && !clients.contains_key(&client) {
            let window = self.window;
            clients.retain(|_, w| now.saturating_duration_since(w.started) < window);
        }
        let entry = clients.entry(client).or_insert(ClientWindow {
            started: now,
            count: 0,
        });
        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.window {
            *entry = ClientWindow {
                started: now,
                count: 0,
            };
        }
        if entry.count >= self.max_requests {
            return RateDecision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }
        entry.count += 1;
        RateDecision::Allowed
    }
}

pub(super) async fn enforce_rate_limit(
    State(state): State<GatewayState>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    match state.rate_limiter.check(client) {
        RateDecision::Allowed => next.run(request).await,
        RateDecision::Limited { retry_after } => ApiError::RateLimited {
            retry_after_secs: retry_after.as_secs().max(1),
        }
        .into_response(),
    }
}
