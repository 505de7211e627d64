// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Bot Verdict
//!
//! This crate classifies a visitor as bot or human from its claimed IP
//! address and User-Agent, for front-ends that want a lightweight access
//! signal:
//!
//! - User-Agent signature matching
//! - Hosting/cloud/VPN provider blocklist over a network-identity lookup
//! - Per-IP sliding-window traffic threshold
//! - Verdict = any signal fired, with a per-signal breakdown

pub mod blocklist;
pub mod classifier;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod patterns;
pub mod reputation;

pub use classifier::{BotClassifier, ClassificationRequest, ClassificationResult, SignalBreakdown};
pub use config::Config;
pub use limiter::RateLimiter;
pub use reputation::{IpInfoResolver, ReputationAdapter, ReputationRecord, ReputationResolver};
