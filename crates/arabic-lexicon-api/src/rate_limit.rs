use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::Json;
use axum::body::Body;
use axum::http::{HeaderName, Request, Response, StatusCode};
use axum::response::IntoResponse;
use dashmap::DashMap;
use serde_json::json;
use tower::{Layer, Service};
use tracing::warn;

const LOG_INTERVAL: Duration = Duration::from_secs(60);
const MAX_TRACKED_CLIENTS: usize = 10_000;
const IDLE_BUCKET_TTL: Duration = Duration::from_secs(600);
const EXEMPT_PATHS: &[&str] = &["/healthz"];

#[derive(Clone)]
pub struct RateLimiter<S> {
    inner: S,
    state: SharedState,
    client_header: HeaderName,
    rate_per_sec: f64,
    burst: f64,
}

#[derive(Clone)]
struct SharedState {
    buckets: Arc<DashMap<String, Bucket>>,
    dropped_since_log: Arc<AtomicU64>,
    last_log: Arc<Mutex<Instant>>,
}

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Per-client token bucket keyed on a proxy header.
///
/// Requests without the header pass through untouched. Every service this
/// layer wraps draws from the same buckets, so a router's routes share one
/// limit.
#[derive(Clone)]
pub struct RateLimiterLayer {
    state: SharedState,
    rate_per_sec: f64,
    burst: f64,
    client_header: HeaderName,
}

impl RateLimiterLayer {
    pub fn new(rate_per_sec: u32, burst: u32) -> Self {
        Self {
            state: SharedState {
                buckets: Arc::new(DashMap::new()),
                dropped_since_log: Arc::new(AtomicU64::new(0)),
                last_log: Arc::new(Mutex::new(Instant::now())),
            },
            rate_per_sec: rate_per_sec as f64,
            burst: burst as f64,
            client_header: HeaderName::from_static("x-forwarded-for"),
        }
    }

    pub fn with_client_header(mut self, header: HeaderName) -> Self {
        self.client_header = header;
        self
    }
}

impl<S> Layer<S> for RateLimiterLayer {
    type Service = RateLimiter<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimiter {
            inner,
            state: self.state.clone(),
            client_header: self.client_header.clone(),
            rate_per_sec: self.rate_per_sec,
            burst: self.burst,
        }
    }
}

impl<S, ReqBody> Service<Request<ReqBody>> for RateLimiter<S>
where
    S: Service<Request<ReqBody>, Response = Response<Body>> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let exempt = EXEMPT_PATHS.contains(&req.uri().path());
        if !exempt
            && let Some(client) = client_id(&req, &self.client_header)
            && !self.check_and_consume(&client)
        {
            self.state.dropped_since_log.fetch_add(1, Ordering::Relaxed);
            log_drops_if_needed(&self.state);
            return Box::pin(async move {
                Ok((
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({ "error": "rate limited" })),
                )
                    .into_response())
            });
        }

        let fut = self.inner.call(req);
        Box::pin(async move { fut.await })
    }
}

/// First address in the client header; proxies append to the right.
fn client_id<B>(req: &Request<B>, header: &HeaderName) -> Option<String> {
    req.headers()
        .get(header)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl<S> RateLimiter<S> {
    fn check_and_consume(&self, client: &str) -> bool {
        let now = Instant::now();
        if self.state.buckets.len() > MAX_TRACKED_CLIENTS {
            self.state.buckets.retain(|_, bucket| {
                now.saturating_duration_since(bucket.last_refill) < IDLE_BUCKET_TTL
            });
        }

        let mut entry = self
            .state
            .buckets
            .entry(client.to_string())
            .or_insert(Bucket {
                tokens: self.burst,
                last_refill: now,
            });
        let elapsed = now
            .saturating_duration_since(entry.last_refill)
            .as_secs_f64();
        if elapsed > 0.0 {
            entry.tokens = (entry.tokens + elapsed * self.rate_per_sec).min(self.burst);
            entry.last_refill = now;
        }
        if entry.tokens >= 1.0 {
            entry.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

fn log_drops_if_needed(state: &SharedState) {
    let now = Instant::now();
    let Ok(mut last) = state.last_log.lock() else {
        return;
    };
    if now.saturating_duration_since(*last) >= LOG_INTERVAL {
        let dropped = state.dropped_since_log.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            warn!("rate limiter dropped {dropped} requests in the last minute");
        }
        *last = now;
    }
}
