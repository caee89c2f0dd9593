use std::env;
use std::fmt;

use axum::Json;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::Url;
use serde::de::IgnoredAny;
use serde_json::{Value, json};

use crate::stats::TRACKED_TYPE_IDS;

pub const DEFAULT_BASE_URL: &str = "https://api.sportmonks.com/v3/football";
pub const INPLAY_PATH: &str = "livescores/inplay";
pub const INCLUDE: &str = "periods;scores;trends;participants;statistics";
pub const TIMEZONE: &str = "Europe/London";
pub const POPULATE: u32 = 400;
pub const TOKEN_VAR: &str = "SPORTMONKS_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Looked up in the environment on every request.
    Env(&'static str),
    Fixed(Option<String>),
}

impl Credential {
    pub fn resolve(&self) -> Option<String> {
        match self {
            Credential::Env(key) => opt_env(key),
            Credential::Fixed(token) => token.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub credential: Credential,
    pub base_url: String,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self {
            credential: Credential::Env(TOKEN_VAR),
            base_url: opt_env("SPORTMONKS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|val| {
        let trimmed = val.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    Config(String),
    Upstream { status: u16, body: String },
    Transport(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GatewayError::Config(_) | GatewayError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Config(msg) | GatewayError::Transport(msg) => f.write_str(msg),
            GatewayError::Upstream { .. } => f.write_str("Upstream error"),
        }
    }
}

impl std::error::Error for GatewayError {}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            GatewayError::Upstream {
                status: upstream,
                body,
            } => json!({
                "error": self.to_string(),
                "status": upstream,
                "body": body,
            }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

pub fn stat_filters() -> String {
    let ids = TRACKED_TYPE_IDS
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("fixtureStatisticTypes:{ids};trendTypes:{ids}")
}

pub fn inplay_url(base_url: &str, api_token: &str) -> Result<Url, GatewayError> {
    let endpoint = format!("{}/{INPLAY_PATH}", base_url.trim_end_matches('/'));
    let mut url = Url::parse(&endpoint)
        .map_err(|err| GatewayError::Config(format!("invalid upstream url: {err}")))?;
    url.query_pairs_mut()
        .append_pair("api_token", api_token)
        .append_pair("include", INCLUDE)
        .append_pair("filters", &stat_filters())
        .append_pair("timezone", TIMEZONE)
        .append_pair("populate", &POPULATE.to_string());
    Ok(url)
}

/// Fetches in-play fixtures and returns the upstream body bytes as received.
/// Non-success statuses come back as `GatewayError::Upstream`; nothing is retried.
pub async fn fetch_inplay(
    client: &reqwest::Client,
    config: &GatewayConfig,
) -> Result<Bytes, GatewayError> {
    let token = config
        .credential
        .resolve()
        .ok_or_else(|| GatewayError::Config(format!("Missing {TOKEN_VAR}")))?;
    let url = inplay_url(&config.base_url, &token)?;

    let resp = client.get(url).send().await.map_err(transport)?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.map_err(transport)?;
        return Err(GatewayError::Upstream {
            status: status.as_u16(),
            body,
        });
    }
    let body = resp.bytes().await.map_err(transport)?;
    serde_json::from_slice::<IgnoredAny>(&body)
        .map_err(|err| GatewayError::Transport(format!("invalid upstream json: {err}")))?;
    Ok(body)
}

// The request url carries the credential, so it never reaches the message.
fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.without_url().to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::{Credential, GatewayError, inplay_url, stat_filters};

    #[test]
    fn filters_cover_statistics_and_trends() {
        assert_eq!(
            stat_filters(),
            "fixtureStatisticTypes:34,42,43,44,45,52,58,83,98,99;trendTypes:34,42,43,44,45,52,58,83,98,99"
        );
    }

    #[test]
    fn url_carries_fixed_query() {
        let url = inplay_url("https://api.example.test/v3/football/", "secret").expect("url");
        assert_eq!(url.path(), "/v3/football/livescores/inplay");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("api_token"), Some("secret"));
        assert_eq!(
            get("include"),
            Some("periods;scores;trends;participants;statistics")
        );
        assert_eq!(get("timezone"), Some("Europe/London"));
        assert_eq!(get("populate"), Some("400"));
        assert!(get("filters").is_some_and(|f| f.starts_with("fixtureStatisticTypes:34,")));
    }

    #[test]
    fn env_credential_is_read_per_call() {
        const KEY: &str = "LIVESCORE_PULSE_GATEWAY_TEST_TOKEN";
        let credential = Credential::Env(KEY);
        unsafe { std::env::remove_var(KEY) };
        assert_eq!(credential.resolve(), None);
        unsafe { std::env::set_var(KEY, "  fresh  ") };
        assert_eq!(credential.resolve().as_deref(), Some("fresh"));
        unsafe { std::env::set_var(KEY, " ") };
        assert_eq!(credential.resolve(), None);
        unsafe { std::env::remove_var(KEY) };

        assert_eq!(Credential::Fixed(None).resolve(), None);
    }

    #[test]
    fn bad_base_url_is_config_error() {
        let err = inplay_url("not a url", "secret").expect_err("invalid");
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn error_statuses() {
        let upstream = GatewayError::Upstream {
            status: 503,
            body: "down".to_string(),
        };
        assert_eq!(upstream.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            GatewayError::Config("Missing SPORTMONKS_TOKEN".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::Transport("connection reset".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
