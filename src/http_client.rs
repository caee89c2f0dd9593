use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("livescore_pulse/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client for the dashboard's poll workers.
pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(request_timeout())
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")
    })
}

/// Async client for the proxy. Built per server so pooled connections stay on
/// the runtime that created them.
pub fn build_async_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(request_timeout())
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build async http client")
}

pub fn request_timeout() -> Duration {
    let secs = env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|val| val.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
        .clamp(1, 60);
    Duration::from_secs(secs)
}
