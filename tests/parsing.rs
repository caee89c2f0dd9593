use std::fs;
use std::path::PathBuf;

use livescore_pulse::livescore_fetch::{decode_proxy_response, parse_livescores_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_inplay_fixture() {
    let raw = read_fixture("livescores.json");
    let rows = parse_livescores_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 2);

    let first = &rows[0];
    assert_eq!(first.id, "19135003");
    assert_eq!(first.match_label, "Arsenal – Chelsea");
    assert_eq!(first.time_label, "67'");
    assert_eq!(first.corners.to_string(), "5–3");
    assert_eq!(first.dangerous_attacks_first_half.to_string(), "30–22");
    assert_eq!(first.dangerous_attacks_second_half.to_string(), "41–19");
    assert_eq!(first.delta.to_string(), "11–-3");
}

#[test]
fn fixture_without_statistics_reads_zero() {
    let raw = read_fixture("livescores.json");
    let rows = parse_livescores_json(&raw).expect("fixture should parse");
    let second = &rows[1];
    assert_eq!(second.id, "19135004");
    // Away is listed first but the location tags win.
    assert_eq!(second.match_label, "Leeds – Everton");
    assert_eq!(second.time_label, "HT");
    for pair in [
        second.corners,
        second.dangerous_attacks_first_half,
        second.dangerous_attacks_second_half,
        second.delta,
    ] {
        assert_eq!(pair.to_string(), "0–0");
    }
}

#[test]
fn untagged_participants_fall_back_to_position() {
    let raw = read_fixture("livescores_untagged.json");
    let rows = parse_livescores_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 2);

    let first = &rows[0];
    assert_eq!(first.match_label, "Rangers – Away");
    assert_eq!(first.id, "fixture-0-Rangers-Away");
    assert_eq!(first.time_label, "45+1'");
    assert_eq!(first.corners.to_string(), "4–0");
    // Duplicate records: the first in list order wins.
    assert_eq!(first.dangerous_attacks_first_half.to_string(), "12.5–0");
    assert_eq!(first.delta.to_string(), "-12.5–0");

    let empty = &rows[1];
    assert_eq!(empty.match_label, "Home – Away");
    assert_eq!(empty.id, "fixture-1-Home-Away");
    assert_eq!(empty.time_label, "–");
    assert_eq!(empty.corners.to_string(), "0–0");
}

#[test]
fn missing_data_means_no_fixtures() {
    assert!(parse_livescores_json("{}").expect("empty object").is_empty());
    assert!(
        parse_livescores_json(r#"{"data": null}"#)
            .expect("null data")
            .is_empty()
    );
    assert!(parse_livescores_json(r#"{"data": []}"#).expect("no data").is_empty());
}

#[test]
fn malformed_body_is_an_error() {
    let err = parse_livescores_json("{not json").expect_err("should fail");
    assert!(err.to_string().contains("invalid livescores json"));
}

#[test]
fn proxy_error_status_is_reported() {
    let raw = read_fixture("livescores.json");
    let err = decode_proxy_response(502, &raw).expect_err("status should fail");
    assert_eq!(err.to_string(), "API 502");
    let rows = decode_proxy_response(200, &raw).expect("ok status");
    assert_eq!(rows.len(), 2);
}
