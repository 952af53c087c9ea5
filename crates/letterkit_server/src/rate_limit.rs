//! Per-client fixed-window rate limiting.

use crate::config::RateLimitConfig;
use crate::error::{ServerError, ServerResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Number of tracked clients above which stale windows are pruned.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug, Default)]
struct State {
    windows: HashMap<IpAddr, Window>,
    last_prune: Option<Instant>,
}

impl State {
    fn prune(&mut self, now: Instant, window: Duration) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < window);
        self.last_prune = Some(now);
        before - self.windows.len()
    }
}

/// Fixed-window request limiter keyed by client address.
///
/// Each client gets `max_requests` per `window`; the window starts with the
/// client's first request and resets once it has fully elapsed.
///
/// Once many clients are tracked, stale windows are swept at most once per
/// window length, so a map full of live clients is not rescanned on every
/// request.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    state: Mutex<State>,
}

impl RateLimiter {
    /// Creates a limiter.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Mutex::new(State::default()),
        }
    }

    /// Records a request from `client` now.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::RateLimited`] when the client is over budget.
    pub fn check(&self, client: IpAddr) -> ServerResult<()> {
        self.check_at(client, Instant::now())
    }

    /// Records a request from `client` at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::RateLimited`] when the client is over budget.
    pub fn check_at(&self, client: IpAddr, now: Instant) -> ServerResult<()> {
        let mut state = self.state.lock();
        let window = self.config.window;

        let prune_due = state
            .last_prune
            .map_or(true, |at| now.saturating_duration_since(at) >= window);
        if state.windows.len() >= PRUNE_THRESHOLD && prune_due {
            let removed = state.prune(now, window);
            debug!(removed, tracked = state.windows.len(), "pruned rate limit windows");
        }

        let entry = state.windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });

        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.config.max_requests {
            let retry_after = window.saturating_sub(now.saturating_duration_since(entry.started));
            warn!(%client, ?retry_after, "rate limit exceeded");
            return Err(ServerError::RateLimited { retry_after });
        }

        entry.count += 1;
        debug!(%client, count = entry.count, "request admitted");
        Ok(())
    }

    /// Drops windows that have fully elapsed. Returns how many were removed.
    pub fn prune_at(&self, now: Instant) -> usize {
        self.state.lock().prune(now, self.config.window)
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.state.lock().windows.len()
    }
}
