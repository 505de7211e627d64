// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Hosting, cloud, CDN and VPN provider blocklist.
//!
//! An organization is a known provider if its lower-cased name contains any
//! entry as a substring, so `"Google LLC Cloud Infra"` matches `"google llc"`.

use tracing::warn;

/// Case-insensitive substring blocklist of organization names.
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    /// Lower-cased entries, in configured order
    entries: Vec<String>,
}

impl Blocklist {
    /// Build a blocklist from configured entries.
    ///
    /// Blank entries are dropped: an empty substring would match every
    /// organization.
    pub fn new<S: AsRef<str>>(entries: &[S]) -> Self {
        let entries = entries
            .iter()
            .filter_map(|entry| {
                let entry = entry.as_ref().trim();
                if entry.is_empty() {
                    warn!("Ignoring blank blocklist entry");
                    None
                } else {
                    Some(entry.to_lowercase())
                }
            })
            .collect();

        Self { entries }
    }

    /// True if `organization` contains any blocklist entry.
    pub fn is_known_provider(&self, organization: &str) -> bool {
        self.matching_entry(organization).is_some()
    }

    /// First entry contained in `organization`.
    pub fn matching_entry(&self, organization: &str) -> Option<&str> {
        let organization = organization.to_lowercase();
        self.entries
            .iter()
            .find(|entry| organization.contains(entry.as_str()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
