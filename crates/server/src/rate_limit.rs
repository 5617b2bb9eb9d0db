//! Per-client rate limiting
//!
//! Fixed windows keyed by client IP. A window opens on the first request
//! from an address and admits `max_requests` until it expires; the next
//! request after expiry opens a fresh window.

use dashmap::DashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use thiserror::Error;

use dog_assistant_config::RateLimitConfig;

/// Request refused because the client's window is full
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Rate limit exceeded: {max_requests} per {window_secs} seconds")]
pub struct RateLimitError {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl RateLimitError {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window_secs: window.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    windows: DashMap<IpAddr, Window>,
    max_requests: u32,
    window: Duration,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
            enabled: true,
        }
    }

    /// Limiter that admits everything
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(u32::MAX, Duration::from_secs(1))
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        if config.enabled {
            Self::new(config.max_requests, config.window())
        } else {
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Count a request from `client`
    pub fn check(&self, client: IpAddr) -> Result<(), RateLimitError> {
        self.check_at(client, Instant::now())
    }

    /// Count a request from `client` at `now`
    pub fn check_at(&self, client: IpAddr, now: Instant) -> Result<(), RateLimitError> {
        if !self.enabled {
            return Ok(());
        }

        let mut entry = self.windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        let window = entry.value_mut();

        if now.saturating_duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.max_requests {
            tracing::warn!(
                client = %client,
                limit = self.max_requests,
                window_secs = self.window.as_secs(),
                "Rate limit exceeded"
            );
            return Err(RateLimitError::new(self.max_requests, self.window));
        }

        window.count += 1;
        Ok(())
    }

    /// Drop windows that have expired; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, window| now.saturating_duration_since(window.started) < self.window);
        before.saturating_sub(self.windows.len())
    }

    /// Number of clients with an open window
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
