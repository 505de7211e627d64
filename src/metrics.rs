// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for classification outcomes.

use crate::classifier::ClassificationResult;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Service metrics, registered in a private registry.
///
/// Cloning shares the underlying counters.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    verdicts: IntCounterVec,
    signals: IntCounterVec,
    resolver_failures: IntCounter,
    tracked_sources: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let verdicts = IntCounterVec::new(
            Opts::new("bot_verdict_classifications_total", "Classifications by verdict"),
            &["verdict"],
        )?;
        let signals = IntCounterVec::new(
            Opts::new("bot_verdict_signal_matches_total", "Signals that fired, by signal"),
            &["signal"],
        )?;
        let resolver_failures = IntCounter::new(
            "bot_verdict_resolver_failures_total",
            "Identity lookups that failed and degraded to Unknown",
        )?;
        let tracked_sources = IntGauge::new(
            "bot_verdict_tracked_sources",
            "Sources with a live traffic window",
        )?;

        registry.register(Box::new(verdicts.clone()))?;
        registry.register(Box::new(signals.clone()))?;
        registry.register(Box::new(resolver_failures.clone()))?;
        registry.register(Box::new(tracked_sources.clone()))?;

        Ok(Self {
            registry,
            verdicts,
            signals,
            resolver_failures,
            tracked_sources,
        })
    }

    /// Count a finished classification.
    pub fn record_verdict(&self, result: &ClassificationResult) {
        let verdict = if result.is_bot { "bot" } else { "human" };
        self.verdicts.with_label_values(&[verdict]).inc();

        if result.signals.user_agent_matched {
            self.signals.with_label_values(&["user_agent"]).inc();
        }
        if result.signals.reputation_matched {
            self.signals.with_label_values(&["reputation"]).inc();
        }
        if result.signals.traffic_exceeded {
            self.signals.with_label_values(&["traffic"]).inc();
        }
    }

    pub fn record_resolver_failure(&self) {
        self.resolver_failures.inc();
    }

    pub fn set_tracked_sources(&self, count: usize) {
        self.tracked_sources.set(count as i64);
    }

    pub fn resolver_failures(&self) -> u64 {
        self.resolver_failures.get()
    }

    pub fn verdict_count(&self, verdict: &str) -> u64 {
        self.verdicts.with_label_values(&[verdict]).get()
    }

    /// Render all metrics in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
