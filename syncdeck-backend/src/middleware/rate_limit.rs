//! Request-rate ceilings and query bounds.
//!
//! Each route belongs to a sensitivity class with its own per-origin ceiling
//! over a sliding 15-minute window. Exceeding a ceiling rejects the request
//! immediately with 429 and a retry-after message; nothing is queued or
//! delayed. The counters are the only state.

use std::time::{Duration, Instant};

use actix_web::{HttpRequest, HttpResponse};
use dashmap::DashMap;

/// Span over which request counts are capped, per origin and class.
const RATE_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Fallback when a list query sends no usable `limit`.
pub const DEFAULT_QUERY_LIMIT: usize = 100;
/// Hard ceiling on any client-supplied `limit`.
pub const MAX_QUERY_LIMIT: usize = 1000;

/// Route sensitivity classes, strictest ceilings for the routes that spawn
/// work (sync triggers) or guard credentials (auth initiation and callback).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateClass {
    AuthInit,
    AuthCallback,
    AuthStatus,
    Read,
    Write,
    SyncTrigger,
}

impl RateClass {
    fn key(self) -> &'static str {
        match self {
            RateClass::AuthInit => "auth-init",
            RateClass::AuthCallback => "auth-callback",
            RateClass::AuthStatus => "auth-status",
            RateClass::Read => "read",
            RateClass::Write => "write",
            RateClass::SyncTrigger => "sync",
        }
    }

    /// Requests allowed per origin per window.
    pub fn ceiling(self) -> usize {
        match self {
            RateClass::AuthInit => 5,
            RateClass::AuthCallback => 10,
            RateClass::AuthStatus => 100,
            RateClass::Read => 100,
            RateClass::Write => 50,
            RateClass::SyncTrigger => 10,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RateClass::AuthInit => {
                "Too many authentication attempts from this IP, please try again after 15 minutes"
            }
            RateClass::AuthCallback => {
                "Too many authentication callbacks from this IP, please try again after 15 minutes"
            }
            RateClass::AuthStatus | RateClass::Read => {
                "Too many requests from this IP, please try again after 15 minutes"
            }
            RateClass::Write => {
                "Too many write requests from this IP, please try again after 15 minutes"
            }
            RateClass::SyncTrigger => {
                "Too many sync operations from this IP, please try again after 15 minutes"
            }
        }
    }
}

/// Sliding-window request counter per `class:origin` key.
pub struct RateLimiter {
    window: Duration,
    hits: DashMap<String, Vec<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_window(RATE_WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            hits: DashMap::new(),
        }
    }

    /// Record one request from `origin` in `class`. Err carries the
    /// retry-after message when the ceiling is already reached.
    pub fn check(&self, class: RateClass, origin: &str) -> Result<(), &'static str> {
        let key = format!("{}:{}", class.key(), origin);
        let mut hits = self.hits.entry(key).or_default();
        let now = Instant::now();
        hits.retain(|t| now.duration_since(*t) < self.window);
        if hits.len() >= class.ceiling() {
            return Err(class.message());
        }
        hits.push(now);
        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard called at the top of each handler, in the same shape as the session
/// validation helpers: Ok to proceed, Err is the ready-made 429 response.
pub fn enforce(
    limiter: &RateLimiter,
    req: &HttpRequest,
    class: RateClass,
) -> Result<(), HttpResponse> {
    let origin = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();

    limiter.check(class, &origin).map_err(|message| {
        log::warn!("rate limit exceeded: class={} origin={}", class.key(), origin);
        HttpResponse::TooManyRequests().json(serde_json::json!({ "message": message }))
    })
}

/// Bound a client-supplied `limit` query parameter: non-numeric or
/// non-positive input falls back to the default, oversized input truncates
/// to the hard ceiling.
pub fn clamp_query_limit(raw: Option<&str>) -> usize {
    match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
        Some(n) if n >= 1 => (n as usize).min(MAX_QUERY_LIMIT),
        _ => DEFAULT_QUERY_LIMIT,
    }
}
