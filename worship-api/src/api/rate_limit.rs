//! Per-client request rate limiting
//!
//! One `governor` keyed limiter, keyed by client IP: each client gets a
//! burst of `max_requests`, replenished evenly over `window`. Requests
//! without connection info (e.g. in-process test calls) share one key.

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::Quota;
use tracing::warn;

use super::ApiError;
use crate::AppState;

/// Tracked client count above which idle keys are dropped
const RETAIN_THRESHOLD: usize = 10_000;

type ClientKey = Option<IpAddr>;

type KeyedLimiter =
    governor::RateLimiter<ClientKey, DefaultKeyedStateStore<ClientKey>, DefaultClock>;

/// Outcome of one rate check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Limited { retry_after: Duration },
}

pub struct RateLimiter {
    /// `None` when limiting is disabled
    limiter: Option<KeyedLimiter>,
    clock: DefaultClock,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl RateLimiter {
    /// `max_requests == 0` or a zero `window` disables limiting
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let quota = NonZeroU32::new(max_requests).and_then(|burst| {
            Quota::with_period(window / max_requests).map(|q| q.allow_burst(burst))
        });

        Self {
            limiter: quota.map(governor::RateLimiter::keyed),
            clock: DefaultClock::default(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            limiter: None,
            clock: DefaultClock::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Count one request from `client`
    pub fn check(&self, client: ClientKey) -> Decision {
        let Some(limiter) = &self.limiter else {
            return Decision::Allowed;
        };

        if limiter.len() > RETAIN_THRESHOLD {
            limiter.retain_recent();
        }

        match limiter.check_key(&client) {
            Ok(()) => Decision::Allowed,
            Err(not_until) => Decision::Limited {
                retry_after: not_until.wait_time_from(self.clock.now()),
            },
        }
    }
}

/// Rate limiting middleware, applied to every route
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.limiter.is_enabled() {
        return Ok(next.run(request).await);
    }

    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match state.limiter.check(client) {
        Decision::Allowed => Ok(next.run(request).await),
        Decision::Limited { retry_after } => {
            warn!("Rate limit exceeded for {:?}", client);
            Err(ApiError::RateLimited {
                // Round up so clients never retry early
                retry_after_secs: retry_after.as_secs()
                    + u64::from(retry_after.subsec_nanos() > 0),
            })
        }
    }
}
