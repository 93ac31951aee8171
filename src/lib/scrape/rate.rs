use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

use tracing::debug;

use crate::config::{HTTP_TIMEOUT, USER_AGENT};

/// A blocking HTTP client that enforces a minimum delay between calls.
/// Upstream APIs rate-limit aggressively; a violation shows up as a
/// transient HTTP failure and wastes a whole build cycle for that URL.
pub struct RateLimited {
    inner: reqwest::blocking::Client,
    delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimited {
    pub fn new(delay: Duration) -> color_eyre::Result<Self> {
        let inner = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self {
            inner,
            delay,
            last_request: Mutex::new(None),
        })
    }

    /// Calls `f` with the inner client, sleeping first if necessary so that
    /// at least `delay` has passed since the previous call completed.
    pub fn with<T>(&self, f: impl FnOnce(&reqwest::blocking::Client) -> T) -> T {
        let mut last_request = self.last_request.lock().expect("rate limiter lock poisoned");
        let now = Instant::now();
        if let Some(last) = *last_request
            && let Some(remaining) = self.delay.checked_sub(now.duration_since(last))
        {
            debug!(wait = ?remaining, "rate limit");
            std::thread::sleep(remaining);
        }
        let res = f(&self.inner);
        *last_request = Some(Instant::now());
        res
    }

    pub fn get(&self, url: &str) -> reqwest::Result<reqwest::blocking::Response> {
        self.with(|client| client.get(url).send())
    }
}
