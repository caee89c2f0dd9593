use serde_json::Value;

use crate::json_pick::{as_finite_f64, as_i64, as_id_string, pick_first, relation_list};

// Sportmonks statistic type codes.
pub const CORNERS: i64 = 34;
pub const DANGEROUS_ATTACKS: i64 = 44;

// Sportmonks period codes.
pub const FIRST_HALF: i64 = 1;
pub const SECOND_HALF: i64 = 2;

pub const TRACKED_TYPE_IDS: [i64; 10] = [34, 42, 43, 44, 45, 52, 58, 83, 98, 99];

const TYPE_PATHS: &[&[&str]] = &[
    &["type_id"],
    &["typeId"],
    &["type", "id"],
    &["type", "data", "id"],
];
const PERIOD_PATHS: &[&[&str]] = &[
    &["period_id"],
    &["periodId"],
    &["period", "id"],
    &["period", "data", "id"],
];
const PARTICIPANT_PATHS: &[&[&str]] = &[
    &["participant_id"],
    &["participantId"],
    &["participant", "id"],
    &["participant", "data", "id"],
];
const VALUE_PATHS: &[&[&str]] = &[&["value"], &["data", "value"], &["attributes", "value"]];

#[derive(Debug, Clone, PartialEq)]
pub struct StatRecord {
    pub type_id: i64,
    pub period_id: Option<i64>,
    pub participant_id: Option<String>,
    pub value: Option<f64>,
}

impl StatRecord {
    pub fn from_value(raw: &Value) -> Option<Self> {
        let type_id = pick_first(raw, TYPE_PATHS).and_then(as_i64)?;
        let period_id = pick_first(raw, PERIOD_PATHS).and_then(as_i64);
        let participant_id = pick_first(raw, PARTICIPANT_PATHS).and_then(as_id_string);
        let value = pick_first(raw, VALUE_PATHS).and_then(as_finite_f64);
        Some(Self {
            type_id,
            period_id,
            participant_id,
            value,
        })
    }

    fn matches(&self, type_id: i64, period_id: Option<i64>, participant_id: Option<&str>) -> bool {
        if self.type_id != type_id {
            return false;
        }
        if let Some(period) = period_id
            && self.period_id != Some(period)
        {
            return false;
        }
        if let Some(participant) = participant_id
            && self.participant_id.as_deref() != Some(participant)
        {
            return false;
        }
        true
    }
}

pub fn parse_stat_records(statistics: Option<&Value>) -> Vec<StatRecord> {
    relation_list(statistics)
        .iter()
        .filter_map(StatRecord::from_value)
        .collect()
}

// `None` constraints match anything. The first record in list order wins,
// even when its value is unusable.
pub fn match_stat(
    records: &[StatRecord],
    type_id: i64,
    period_id: Option<i64>,
    participant_id: Option<&str>,
) -> f64 {
    records
        .iter()
        .find(|record| record.matches(type_id, period_id, participant_id))
        .and_then(|record| record.value)
        .unwrap_or(0.0)
}
