use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::http_client::http_client;
use crate::json_pick::{as_id_string, as_trimmed_str, pick_first, relation_list};
use crate::state::{LiveRow, StatPair};
use crate::stats::{
    CORNERS, DANGEROUS_ATTACKS, FIRST_HALF, SECOND_HALF, StatRecord, match_stat,
    parse_stat_records,
};

pub const HOME_PLACEHOLDER: &str = "Home";
pub const AWAY_PLACEHOLDER: &str = "Away";
pub const NO_TIME: &str = "–";
const HALF_TIME: &str = "HT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Home,
    Away,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: Option<String>,
    pub name: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Side {
    pub label: String,
    pub participant_id: Option<String>,
}

pub fn fetch_livescores(url: &str) -> Result<Vec<LiveRow>> {
    let client = http_client()?;
    let resp = client.get(url).send().context("request failed")?;
    let status = resp.status().as_u16();
    let body = resp.text().context("failed reading body")?;
    decode_proxy_response(status, &body)
}

/// Turns a proxy reply into rows; a non-2xx status is reported as `API {status}`.
pub fn decode_proxy_response(status: u16, body: &str) -> Result<Vec<LiveRow>> {
    if !(200..300).contains(&status) {
        return Err(anyhow!("API {status}"));
    }
    parse_livescores_json(body)
}

pub fn parse_livescores_json(raw: &str) -> Result<Vec<LiveRow>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid livescores json")?;
    Ok(rows_from_response(&root))
}

pub fn rows_from_response(root: &Value) -> Vec<LiveRow> {
    let Some(Value::Array(fixtures)) = root.get("data") else {
        return Vec::new();
    };
    fixtures
        .iter()
        .enumerate()
        .map(|(index, fixture)| normalize_fixture(fixture, index))
        .collect()
}

pub fn normalize_fixture(fixture: &Value, index: usize) -> LiveRow {
    let teams = parse_teams(fixture);
    let home = resolve_side(&teams, Location::Home, 0, HOME_PLACEHOLDER);
    let away = resolve_side(&teams, Location::Away, 1, AWAY_PLACEHOLDER);

    let stats = parse_stat_records(fixture.get("statistics"));
    let corners = side_pair(&stats, CORNERS, None, &home, &away);
    let first_half = side_pair(&stats, DANGEROUS_ATTACKS, Some(FIRST_HALF), &home, &away);
    let second_half = side_pair(&stats, DANGEROUS_ATTACKS, Some(SECOND_HALF), &home, &away);

    LiveRow {
        id: row_id(fixture, index, &home, &away),
        match_label: format!("{} – {}", home.label, away.label),
        time_label: time_label(fixture),
        corners,
        dangerous_attacks_first_half: first_half,
        dangerous_attacks_second_half: second_half,
        delta: StatPair::delta(first_half, second_half),
    }
}

pub fn parse_teams(fixture: &Value) -> Vec<Team> {
    relation_list(fixture.get("participants"))
        .iter()
        .filter(|entry| entry.is_object())
        .map(|entry| Team {
            id: entry.get("id").and_then(as_id_string),
            name: entry
                .get("name")
                .and_then(as_trimmed_str)
                .unwrap_or_default()
                .to_string(),
            location: parse_location(pick_first(entry, &[&["meta", "location"], &["location"]])),
        })
        .collect()
}

fn parse_location(value: Option<&Value>) -> Location {
    match value.and_then(as_trimmed_str) {
        Some(raw) if raw.eq_ignore_ascii_case("home") => Location::Home,
        Some(raw) if raw.eq_ignore_ascii_case("away") => Location::Away,
        _ => Location::Unknown,
    }
}

/// Location tag first, then list position, then the placeholder label.
pub fn resolve_side(teams: &[Team], location: Location, index: usize, placeholder: &str) -> Side {
    let tagged = teams.iter().find(|team| team.location == location);
    let positional = teams.get(index);
    fn named(team: Option<&Team>) -> Option<&str> {
        team.map(|t| t.name.as_str()).filter(|n| !n.is_empty())
    }

    let label = named(tagged)
        .or_else(|| named(positional))
        .unwrap_or(placeholder)
        .to_string();
    let participant_id = tagged.or(positional).and_then(|team| team.id.clone());
    Side {
        label,
        participant_id,
    }
}

// A side without a participant id reads zero rather than matching any participant.
fn side_pair(
    stats: &[StatRecord],
    type_id: i64,
    period_id: Option<i64>,
    home: &Side,
    away: &Side,
) -> StatPair {
    let lookup = |side: &Side| {
        side.participant_id
            .as_deref()
            .map(|id| match_stat(stats, type_id, period_id, Some(id)))
            .unwrap_or(0.0)
    };
    StatPair::new(lookup(home), lookup(away))
}

pub fn time_label(fixture: &Value) -> String {
    if let Some(minute) = minute_label(fixture) {
        return format!("{minute}'");
    }
    let status = pick_first(
        fixture,
        &[
            &["time", "status"],
            &["state", "short_name"],
            &["state", "developer_name"],
        ],
    )
    .and_then(as_trimmed_str);
    match status {
        Some(status) if status.eq_ignore_ascii_case(HALF_TIME) => HALF_TIME.to_string(),
        _ => NO_TIME.to_string(),
    }
}

fn minute_label(fixture: &Value) -> Option<String> {
    pick_first(fixture, &[&["time", "minute"], &["minute"]])
        .and_then(truthy_minute)
        .or_else(|| {
            relation_list(fixture.get("periods"))
                .iter()
                .find(|period| period.get("ticking").and_then(Value::as_bool) == Some(true))
                .and_then(|period| period.get("minutes"))
                .and_then(truthy_minute)
        })
}

// Zero and empty strings mean the clock is not running.
fn truthy_minute(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            let minute = n.as_f64()?;
            if minute == 0.0 || !minute.is_finite() {
                None
            } else {
                Some(n.to_string())
            }
        }
        Value::String(_) => as_trimmed_str(value).map(str::to_string),
        _ => None,
    }
}

fn row_id(fixture: &Value, index: usize, home: &Side, away: &Side) -> String {
    let upstream = fixture
        .get("id")
        .and_then(as_id_string)
        .filter(|id| id != "0");
    upstream.unwrap_or_else(|| format!("fixture-{index}-{}-{}", home.label, away.label))
}
