// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Traffic patterns for simulation.

use std::time::Duration;

/// Which User-Agent pool a scenario draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentMix {
    Browsers,
    Crawlers,
}

/// Which organization pool the resolver assigns to scenario addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginMix {
    Residential,
    Datacenter,
}

/// Traffic pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Requests per second rate (simulated clock)
    pub requests_per_second: f64,
    /// Number of unique IPs to simulate
    pub unique_ips: usize,
    /// User-Agent pool
    pub agents: AgentMix,
    /// Organization pool
    pub origins: OriginMix,
    /// Whether the identity lookup service is down
    pub resolver_down: bool,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            requests_per_second: 10.0,
            unique_ips: 1,
            agents: AgentMix::Browsers,
            origins: OriginMix::Residential,
            resolver_down: false,
        }
    }
}

/// Predefined traffic patterns.
impl AttackConfig {
    /// Single IP flood with a browser User-Agent.
    pub fn single_ip_flood() -> Self {
        Self {
            total_requests: 200,
            requests_per_second: 100.0,
            unique_ips: 1,
            ..Default::default()
        }
    }

    /// Many IPs, each well under the threshold.
    pub fn distributed_attack() -> Self {
        Self {
            total_requests: 500,
            requests_per_second: 50.0,
            unique_ips: 100,
            ..Default::default()
        }
    }

    /// Self-identifying crawlers from residential space.
    pub fn crawler_fleet() -> Self {
        Self {
            total_requests: 110,
            requests_per_second: 5.0,
            unique_ips: 55,
            agents: AgentMix::Crawlers,
            ..Default::default()
        }
    }

    /// Browser User-Agents from hosting providers (headless scrapers).
    pub fn datacenter_scrapers() -> Self {
        Self {
            total_requests: 80,
            requests_per_second: 4.0,
            unique_ips: 40,
            origins: OriginMix::Datacenter,
            ..Default::default()
        }
    }

    /// Datacenter scrapers while the lookup service is unavailable.
    pub fn datacenter_during_outage() -> Self {
        Self {
            resolver_down: true,
            ..Self::datacenter_scrapers()
        }
    }

    /// Slow drip - stay under the traffic threshold.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 60,
            requests_per_second: 0.25, // 8 requests per 30s window
            unique_ips: 1,
            ..Default::default()
        }
    }

    /// Simulated offset of request `index` from the start of the run.
    pub fn offset(&self, index: usize) -> Duration {
        Duration::from_secs_f64(index as f64 / self.requests_per_second)
    }

    /// Calculate simulated duration for the pattern.
    pub fn expected_duration(&self) -> Duration {
        Duration::from_secs_f64(self.total_requests as f64 / self.requests_per_second)
    }
}

/// Expected outcomes for a traffic pattern.
pub struct AttackExpectations {
    /// Minimum ratio of requests that should be judged bots
    pub min_block_ratio: f64,
    /// Maximum ratio of requests that should be judged bots
    pub max_block_ratio: f64,
    /// Description of expected behavior
    pub description: &'static str,
}

impl AttackConfig {
    /// Get expected outcomes for this pattern under a 10-per-30s threshold.
    pub fn expectations(&self) -> AttackExpectations {
        if self.agents == AgentMix::Crawlers {
            AttackExpectations {
                min_block_ratio: 1.0,
                max_block_ratio: 1.0,
                description: "Every self-identifying crawler is a bot",
            }
        } else if self.origins == OriginMix::Datacenter && !self.resolver_down {
            AttackExpectations {
                min_block_ratio: 1.0,
                max_block_ratio: 1.0,
                description: "Every hosting-provider origin is a bot",
            }
        } else if self.unique_ips == 1 && self.expected_duration() < Duration::from_secs(30) {
            let allowed = 10.0 / self.total_requests as f64;
            AttackExpectations {
                min_block_ratio: 1.0 - allowed,
                max_block_ratio: 1.0 - allowed,
                description: "Single IP is flagged after its tenth request",
            }
        } else {
            AttackExpectations {
                min_block_ratio: 0.0,
                max_block_ratio: 0.0,
                description: "Traffic under the threshold from human origins passes",
            }
        }
    }
}
