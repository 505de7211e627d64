// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Network-identity lookups for client addresses.
//!
//! [`ReputationResolver`] is the capability the classifier depends on; the
//! production implementation is [`IpInfoResolver`]. [`ReputationAdapter`]
//! turns any resolver into an infallible source of [`ReputationRecord`]s:
//! a failed lookup degrades to `"Unknown"` instead of failing the request.

use crate::config::ResolverConfig;
use crate::error::{ConfigError, ResolverError};
use crate::metrics::Metrics;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Placeholder for an organization or country the resolver could not supply.
pub const UNKNOWN: &str = "Unknown";

/// Raw answer from a resolver. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub organization: Option<String>,
    pub country: Option<String>,
}

/// Normalized reputation data for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationRecord {
    pub organization: String,
    pub country: String,
}

impl ReputationRecord {
    /// The record used when nothing is known about a source.
    pub fn unknown() -> Self {
        Self {
            organization: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
        }
    }

    fn from_identity(identity: ResolvedIdentity) -> Self {
        Self {
            organization: non_blank(identity.organization).unwrap_or_else(|| UNKNOWN.to_string()),
            country: non_blank(identity.country).unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolves a client address to the organization operating it.
#[async_trait]
pub trait ReputationResolver: Send + Sync {
    /// Look up `source`, which is expected to be an IP literal.
    async fn lookup(&self, source: &str) -> Result<ResolvedIdentity, ResolverError>;

    /// Get the resolver name.
    fn name(&self) -> &'static str;
}

/// Wraps a resolver and absorbs its failures.
#[derive(Clone)]
pub struct ReputationAdapter {
    resolver: Arc<dyn ReputationResolver>,
    metrics: Metrics,
}

impl ReputationAdapter {
    pub fn new(resolver: Arc<dyn ReputationResolver>, metrics: Metrics) -> Self {
        Self { resolver, metrics }
    }

    /// Resolve `source` to a reputation record. Never fails.
    pub async fn resolve(&self, source: &str) -> ReputationRecord {
        match self.resolver.lookup(source).await {
            Ok(identity) => {
                let record = ReputationRecord::from_identity(identity);
                debug!(
                    ip = %source,
                    organization = %record.organization,
                    country = %record.country,
                    "Resolved source identity"
                );
                record
            }
            Err(err) => {
                warn!(
                    ip = %source,
                    resolver = self.resolver.name(),
                    error = %err,
                    "Identity lookup failed, treating organization as unknown"
                );
                self.metrics.record_resolver_failure();
                ReputationRecord::unknown()
            }
        }
    }
}

/// Company or AS entry in an ipinfo response.
#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: Option<String>,
}

/// The subset of the ipinfo response body this service reads.
#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    #[serde(default)]
    company: Option<NamedEntry>,
    #[serde(default)]
    asn: Option<NamedEntry>,
    #[serde(default)]
    org: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl IpInfoResponse {
    /// Company name, then AS name, then the free-tier `org` field.
    fn into_identity(self) -> ResolvedIdentity {
        let organization = self
            .company
            .and_then(|c| non_blank(c.name))
            .or_else(|| self.asn.and_then(|a| non_blank(a.name)))
            .or_else(|| non_blank(self.org).map(|org| strip_as_number(&org).to_string()));

        ResolvedIdentity {
            organization,
            country: self.country,
        }
    }
}

/// Strip a leading `AS<digits> ` from an ipinfo `org` value.
fn strip_as_number(org: &str) -> &str {
    match org.split_once(' ') {
        Some((prefix, rest)) => match (prefix.get(..2), prefix.get(2..)) {
            (Some(head), Some(digits))
                if head.eq_ignore_ascii_case("as")
                    && !digits.is_empty()
                    && digits.chars().all(|c| c.is_ascii_digit()) =>
            {
                rest.trim()
            }
            _ => org,
        },
        None => org,
    }
}

/// Resolver backed by the ipinfo.io HTTP API (or a compatible service).
pub struct IpInfoResolver {
    base_url: Url,
    token: Option<String>,
    client: reqwest::Client,
}

impl IpInfoResolver {
    /// Create a resolver from configuration.
    pub fn new(config: &ResolverConfig) -> Result<Self, ConfigError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|source| ConfigError::InvalidResolverUrl {
                url: config.base_url.clone(),
                source,
            })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidResolverUrl {
                url: config.base_url.clone(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            base_url,
            token: config.token.clone().filter(|t| !t.is_empty()),
            client,
        })
    }

    /// Build the lookup URL for an address.
    fn lookup_url(&self, ip: IpAddr) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&ip.to_string());
        }
        if let Some(token) = &self.token {
            url.query_pairs_mut().append_pair("token", token);
        }
        url
    }
}

#[async_trait]
impl ReputationResolver for IpInfoResolver {
    async fn lookup(&self, source: &str) -> Result<ResolvedIdentity, ResolverError> {
        let ip: IpAddr = source
            .trim()
            .parse()
            .map_err(|_| ResolverError::InvalidAddress(source.to_string()))?;

        let response = self.client.get(self.lookup_url(ip)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::Status(status.as_u16()));
        }

        let body: IpInfoResponse = response
            .json()
            .await
            .map_err(|e| ResolverError::Decode(e.to_string()))?;

        Ok(body.into_identity())
    }

    fn name(&self) -> &'static str {
        "ipinfo"
    }
}
