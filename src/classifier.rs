// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Bot classification.
//!
//! Three independent signals are computed for each request:
//!
//! - the User-Agent matches a known automation signature,
//! - the resolved organization is a hosting, cloud, CDN or VPN provider,
//! - the source has exceeded its traffic threshold.
//!
//! A request is a bot if any signal fires.

use crate::blocklist::Blocklist;
use crate::config::DetectionConfig;
use crate::error::{ClassifyError, ConfigError};
use crate::limiter::RateLimiter;
use crate::metrics::Metrics;
use crate::patterns::PatternMatcher;
use crate::reputation::ReputationAdapter;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// A request to classify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    /// Claimed client address
    pub source_identifier: String,
    /// Raw User-Agent header value
    pub user_agent: String,
}

impl ClassificationRequest {
    /// Build a request, rejecting absent or empty fields.
    ///
    /// A whitespace-only User-Agent is still classified; the source
    /// identifier is trimmed before it keys the traffic window.
    pub fn new(
        source_identifier: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<Self, ClassifyError> {
        let user_agent = match user_agent {
            Some(ua) if !ua.is_empty() => ua,
            _ => return Err(ClassifyError::MissingField("user_agent")),
        };
        let source_identifier = match source_identifier {
            Some(ip) if !ip.is_empty() => ip.trim(),
            _ => return Err(ClassifyError::MissingField("ip")),
        };

        Ok(Self {
            source_identifier: source_identifier.to_string(),
            user_agent: user_agent.to_string(),
        })
    }
}

/// Per-signal breakdown of a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalBreakdown {
    pub user_agent_matched: bool,
    pub reputation_matched: bool,
    pub traffic_exceeded: bool,
    pub organization: String,
}

/// Final verdict with its supporting signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub is_bot: bool,
    pub country: String,
    pub signals: SignalBreakdown,
}

impl ClassificationResult {
    /// Combine signals into a verdict; any signal makes the request a bot.
    pub fn new(country: String, signals: SignalBreakdown) -> Self {
        let is_bot =
            signals.user_agent_matched || signals.reputation_matched || signals.traffic_exceeded;
        Self {
            is_bot,
            country,
            signals,
        }
    }
}

/// Combines signature, reputation and traffic signals into one verdict.
pub struct BotClassifier {
    patterns: PatternMatcher,
    blocklist: Blocklist,
    limiter: RateLimiter,
    reputation: ReputationAdapter,
    metrics: Metrics,
}

impl BotClassifier {
    pub fn new(
        patterns: PatternMatcher,
        blocklist: Blocklist,
        limiter: RateLimiter,
        reputation: ReputationAdapter,
        metrics: Metrics,
    ) -> Self {
        Self {
            patterns,
            blocklist,
            limiter,
            reputation,
            metrics,
        }
    }

    /// Build a classifier from detection settings.
    pub fn from_config(
        detection: &DetectionConfig,
        limiter: RateLimiter,
        reputation: ReputationAdapter,
        metrics: Metrics,
    ) -> Result<Self, ConfigError> {
        let patterns = PatternMatcher::new(&detection.user_agent_patterns)?;
        let blocklist = Blocklist::new(&detection.blocklist);
        debug!(
            patterns = patterns.len(),
            blocklist = blocklist.len(),
            "Classifier configured"
        );
        Ok(Self::new(patterns, blocklist, limiter, reputation, metrics))
    }

    /// Classify a request at the current instant.
    pub async fn classify(&self, request: &ClassificationRequest) -> ClassificationResult {
        self.classify_at(request, Instant::now()).await
    }

    /// Classify a request, recording its traffic at `now`.
    pub async fn classify_at(
        &self,
        request: &ClassificationRequest,
        now: Instant,
    ) -> ClassificationResult {
        let source = request.source_identifier.as_str();

        // Synchronous signals complete before the lookup suspends.
        let user_agent_matched = self.patterns.matches(&request.user_agent);
        let traffic_exceeded = self.limiter.record_and_check(source, now);

        let record = self.reputation.resolve(source).await;
        let reputation_matched = self.blocklist.is_known_provider(&record.organization);

        let result = ClassificationResult::new(
            record.country,
            SignalBreakdown {
                user_agent_matched,
                reputation_matched,
                traffic_exceeded,
                organization: record.organization,
            },
        );

        self.metrics.record_verdict(&result);
        if result.is_bot {
            info!(
                ip = %source,
                user_agent = %request.user_agent,
                organization = %result.signals.organization,
                user_agent_matched,
                reputation_matched,
                traffic_exceeded,
                matched_patterns = ?self.patterns.matching_patterns(&request.user_agent),
                "Classified as bot"
            );
        } else {
            debug!(
                ip = %source,
                organization = %result.signals.organization,
                "Classified as human"
            );
        }

        result
    }

    /// Access the traffic limiter (for periodic sweeps).
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Evict idle traffic windows and publish the remaining count.
    pub fn sweep_idle_sources(&self) -> usize {
        let removed = self.limiter.cleanup();
        self.metrics.set_tracked_sources(self.limiter.tracked_sources());
        removed
    }
}
