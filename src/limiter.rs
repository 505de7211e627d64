// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-source sliding-window traffic counter.
//!
//! Each source keeps the timestamps of its requests inside the trailing
//! window. Every call prunes timestamps older than the window before
//! counting, so the count is exact as of the supplied instant.
//!
//! Windows live in a sharded concurrent map; the prune-append-count sequence
//! for one source runs while holding that source's shard lock, so concurrent
//! requests from the same source cannot undercount. Idle sources are removed
//! by [`RateLimiter::sweep`].

use crate::config::RateLimitConfig;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::debug;

/// Request timestamps for one source, oldest first.
#[derive(Debug, Default)]
struct TrafficWindow {
    request_times: VecDeque<Instant>,
}

impl TrafficWindow {
    /// Drop timestamps strictly older than `now - window`.
    fn prune(&mut self, now: Instant, window: Duration) {
        // Before the clock has run for a full window nothing can be stale.
        let Some(cutoff) = now.checked_sub(window) else {
            return;
        };
        while let Some(&oldest) = self.request_times.front() {
            if oldest < cutoff {
                self.request_times.pop_front();
            } else {
                break;
            }
        }
    }

    /// Insert `now` keeping the timestamps ordered. Callers sample their
    /// instant before taking the lock, so arrivals can be slightly out of order.
    fn push_ordered(&mut self, now: Instant) {
        match self.request_times.back() {
            Some(&newest) if now < newest => {
                let pos = self.request_times.partition_point(|&t| t <= now);
                self.request_times.insert(pos, now);
            }
            _ => self.request_times.push_back(now),
        }
    }
}

/// Thread-safe sliding-window rate limiter keyed by source identifier.
pub struct RateLimiter {
    /// Configuration
    config: RateLimitConfig,
    /// Per-source windows
    windows: DashMap<String, TrafficWindow>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    /// Record a request from `source` at `now` and report whether the source
    /// has exceeded the threshold within the trailing window.
    pub fn record_and_check(&self, source: &str, now: Instant) -> bool {
        let window = self.config.window_duration();

        let count = {
            let mut entry = self.windows.entry(source.to_string()).or_default();
            entry.prune(now, window);
            entry.push_ordered(now);
            entry.request_times.len()
        };

        let exceeded = count > self.config.threshold;
        if exceeded {
            debug!(
                source = %source,
                count,
                threshold = self.config.threshold,
                "Traffic threshold exceeded"
            );
        }
        exceeded
    }

    /// Requests currently counted for `source`, without recording one.
    pub fn window_len(&self, source: &str) -> usize {
        self.windows
            .get(source)
            .map(|w| w.request_times.len())
            .unwrap_or(0)
    }

    /// Number of sources with a window.
    pub fn tracked_sources(&self) -> usize {
        self.windows.len()
    }

    /// Prune every window as of `now` and drop the ones left empty.
    ///
    /// Returns the number of sources removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let window = self.config.window_duration();
        let before = self.windows.len();

        self.windows.retain(|_, w| {
            w.prune(now, window);
            !w.request_times.is_empty()
        });

        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            debug!(removed, remaining = self.windows.len(), "Evicted idle sources");
        }
        removed
    }

    /// Clean up idle sources (should be called periodically).
    pub fn cleanup(&self) -> usize {
        self.sweep(Instant::now())
    }
}
