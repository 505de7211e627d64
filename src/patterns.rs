// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! User-Agent signature matching.
//!
//! The User-Agent is lower-cased before matching, so patterns should be
//! written in lower case.

use crate::error::ConfigError;
use regex::RegexSet;

/// Matches User-Agent strings against known automation signatures.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    set: RegexSet,
}

impl PatternMatcher {
    /// Compile the given patterns, in order.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        // Compile one by one first so the offending pattern can be named.
        for pattern in patterns {
            if let Err(source) = regex::Regex::new(pattern.as_ref()) {
                return Err(ConfigError::InvalidPattern {
                    pattern: pattern.as_ref().to_string(),
                    source,
                });
            }
        }

        let set = RegexSet::new(patterns.iter().map(|p| p.as_ref())).map_err(|source| {
            ConfigError::InvalidPattern {
                pattern: String::new(),
                source,
            }
        })?;

        Ok(Self { set })
    }

    /// True if any pattern matches the lower-cased User-Agent.
    pub fn matches(&self, user_agent: &str) -> bool {
        self.set.is_match(&user_agent.to_lowercase())
    }

    /// Patterns that match, for audit logging.
    pub fn matching_patterns(&self, user_agent: &str) -> Vec<&str> {
        let patterns = self.set.patterns();
        self.set
            .matches(&user_agent.to_lowercase())
            .into_iter()
            .map(|idx| patterns[idx].as_str())
            .collect()
    }

    /// Number of configured patterns.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}
