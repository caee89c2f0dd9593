use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use livescore_pulse::gateway::{GatewayConfig, TOKEN_VAR};
use livescore_pulse::proxy::{ProxyState, router};

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "livescore_pulse=info,livescores_proxy=info,tower_http=info".into()
            }),
        )
        .init();

    let config = GatewayConfig::from_env();
    if config.credential.resolve().is_none() {
        warn!("{TOKEN_VAR} is not set; /api/livescores answers 500 until it is");
    }
    info!("upstream: {}", config.base_url);

    let raw_addr = parse_addr_arg()
        .or_else(|| env::var("PROXY_ADDR").ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());
    let addr: SocketAddr = raw_addr
        .trim()
        .parse()
        .with_context(|| format!("invalid listen address {raw_addr:?}"))?;

    let app = router(ProxyState::new(config)?);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("livescores proxy listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("livescores proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

fn parse_addr_arg() -> Option<String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(addr) = arg.strip_prefix("--addr=") {
            let trimmed = addr.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == "--addr" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
