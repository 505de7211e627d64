// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Bot Verdict Service
//!
//! Answers `POST /api/detect_bot` with a bot/human verdict for the supplied
//! `ip` and `user_agent`.
//!
//! ## Configuration
//!
//! Configuration is loaded from the JSON file named by `CONFIG_FILE` (if
//! set) and then overridden from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `WINDOW_SECS`: Traffic window in seconds (default: 30)
//! - `TRAFFIC_THRESHOLD`: Requests allowed per window (default: 10)
//! - `IPINFO_TOKEN`: ipinfo.io API token
//! - `IPINFO_BASE_URL`: Lookup service base URL (default: https://ipinfo.io)
//! - `RESOLVER_TIMEOUT_MS`: Lookup timeout (default: 2000)
//! - `ALLOWED_ORIGINS`: Comma-separated CORS origins

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bot_verdict::{
    config::Config,
    handlers::{router, AppState},
    reputation::IpInfoResolver,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::load()?;
    info!(
        bind_addr = %config.bind_addr,
        window_secs = config.rate_limit.window_secs,
        threshold = config.rate_limit.threshold,
        patterns = config.detection.user_agent_patterns.len(),
        blocklist = config.detection.blocklist.len(),
        resolver = %config.resolver.base_url,
        "Starting bot verdict service"
    );

    // Create application state
    let resolver = Arc::new(IpInfoResolver::new(&config.resolver)?);
    let state = Arc::new(AppState::new(config.clone(), resolver)?);

    // Spawn idle-source sweep
    let sweep_state = state.clone();
    let sweep_interval = config.rate_limit.sweep_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            sweep_state.classifier.sweep_idle_sources();
        }
    });

    // Build router
    let app = router(state)?;

    // Start server
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
