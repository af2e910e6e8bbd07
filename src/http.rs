use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use reqwest::header::USER_AGENT;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::RateLimit;

const CLIENT_USER_AGENT: &str = concat!("memrise-scrape/", env!("CARGO_PKG_VERSION"));

/// Sliding-window admission gate: at most `max_requests` dispatches in any
/// `window`. Waiters are admitted in the order they called [`acquire`].
///
/// [`acquire`]: RateLimiter::acquire
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    // tokio's Mutex queues waiters fairly, so holding it across the sleep
    // below serializes admission in arrival order.
    dispatched: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        Self {
            max_requests: limit.max_requests.max(1),
            window: limit.window,
            dispatched: Mutex::new(VecDeque::new()),
        }
    }

    pub async fn acquire(&self) {
        let mut dispatched = self.dispatched.lock().await;
        loop {
            let now = Instant::now();
            while let Some(&oldest) = dispatched.front() {
                if now.duration_since(oldest) >= self.window {
                    dispatched.pop_front();
                } else {
                    break;
                }
            }

            if dispatched.len() < self.max_requests {
                dispatched.push_back(now);
                return;
            }

            let Some(&oldest) = dispatched.front() else {
                continue;
            };
            let wait = self.window.saturating_sub(now.duration_since(oldest));
            tracing::debug!(
                wait_ms = wait.as_millis() as u64,
                "request budget exhausted; delaying"
            );
            tokio::time::sleep(wait).await;
        }
    }
}

/// HTTP client whose every request passes through one shared [`RateLimiter`].
///
/// Responses come back whatever their status; only transport failures are
/// errors.
#[derive(Debug, Clone)]
pub struct RateLimitedClient {
    inner: reqwest::Client,
    limiter: Arc<RateLimiter>,
}

impl RateLimitedClient {
    pub fn new(limit: RateLimit) -> anyhow::Result<Self> {
        let inner = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build http client")?;

        Ok(Self::with_client(inner, limit))
    }

    pub fn with_client(inner: reqwest::Client, limit: RateLimit) -> Self {
        Self {
            inner,
            limiter: Arc::new(RateLimiter::new(limit)),
        }
    }

    pub fn get(&self, url: impl reqwest::IntoUrl) -> reqwest::RequestBuilder {
        self.inner.get(url).header(USER_AGENT, CLIENT_USER_AGENT)
    }

    pub fn post(&self, url: impl reqwest::IntoUrl) -> reqwest::RequestBuilder {
        self.inner.post(url).header(USER_AGENT, CLIENT_USER_AGENT)
    }

    pub async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> reqwest::Result<reqwest::Response> {
        self.limiter.acquire().await;
        request.send().await
    }
}
