use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::gateway::{self, GatewayConfig};
use crate::http_client::build_async_client;

#[derive(Clone)]
pub struct ProxyState {
    client: reqwest::Client,
    config: Arc<GatewayConfig>,
}

impl ProxyState {
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_async_client()?,
            config: Arc::new(config),
        })
    }
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/livescores", get(livescores))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn livescores(State(state): State<ProxyState>) -> Response {
    match gateway::fetch_inplay(&state.client, &state.config).await {
        Ok(body) => {
            debug!(bytes = body.len(), "forwarded in-play fixtures");
            (
                [
                    (header::CONTENT_TYPE, "application/json"),
                    (header::CACHE_CONTROL, "no-store"),
                ],
                body,
            )
                .into_response()
        }
        Err(err) => {
            warn!(status = %err.status(), "livescores request failed: {err}");
            err.into_response()
        }
    }
}
