use anyhow::anyhow;

use livescore_pulse::feed::{Cancelled, CycleOutcome};
use livescore_pulse::state::{AppState, Delta, LiveRow, StatPair, apply_delta};

fn row(id: &str, home: f64, away: f64) -> LiveRow {
    LiveRow {
        id: id.to_string(),
        match_label: format!("{id} Home – {id} Away"),
        time_label: "12'".to_string(),
        corners: StatPair::new(home, away),
        dangerous_attacks_first_half: StatPair::default(),
        dangerous_attacks_second_half: StatPair::default(),
        delta: StatPair::default(),
    }
}

fn finish(state: &mut AppState, result: anyhow::Result<Vec<LiveRow>>) {
    let ticket = state.poll.begin_cycle().expect("controller is live");
    apply_delta(
        state,
        Delta::CycleFinished(CycleOutcome { ticket, result }),
    );
}

#[test]
fn first_success_replaces_rows_and_clears_loading() {
    let mut state = AppState::new();
    assert!(state.loading);
    finish(&mut state, Ok(vec![row("1", 2.0, 1.0), row("2", 0.0, 0.0)]));
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(state.rows.len(), 2);
    assert!(state.last_updated.is_some());
    assert!(state.logs.iter().any(|line| line == "[INFO] 2 live fixtures"));
}

#[test]
fn failure_keeps_last_rows_and_sets_error() {
    let mut state = AppState::new();
    finish(&mut state, Ok(vec![row("1", 2.0, 1.0)]));
    finish(&mut state, Err(anyhow!("API 503")));

    assert_eq!(state.error.as_deref(), Some("API 503"));
    assert_eq!(state.rows, vec![row("1", 2.0, 1.0)]);
    assert!(!state.loading);
    assert!(
        state
            .logs
            .iter()
            .any(|line| line == "[WARN] Live fetch error: API 503")
    );
}

#[test]
fn first_cycle_failure_ends_loading_with_no_rows() {
    let mut state = AppState::new();
    finish(&mut state, Err(anyhow!("API 500")));
    assert!(!state.loading);
    assert!(state.rows.is_empty());
    assert_eq!(state.error.as_deref(), Some("API 500"));
}

#[test]
fn success_after_failure_clears_error() {
    let mut state = AppState::new();
    finish(&mut state, Ok(vec![row("1", 2.0, 1.0)]));
    finish(&mut state, Err(anyhow!("API 503")));
    finish(&mut state, Ok(vec![row("1", 3.0, 1.0)]));

    assert!(state.error.is_none());
    assert_eq!(state.rows[0].corners.to_string(), "3–1");
    assert!(state.logs.iter().any(|line| line == "[INFO] Live feed recovered"));
}

#[test]
fn empty_success_replaces_rows() {
    let mut state = AppState::new();
    finish(&mut state, Ok(vec![row("1", 2.0, 1.0)]));
    finish(&mut state, Ok(Vec::new()));
    assert!(state.rows.is_empty());
    assert_eq!(state.selected, 0);
}

#[test]
fn cancellation_is_not_an_error() {
    let mut state = AppState::new();
    finish(&mut state, Ok(vec![row("1", 2.0, 1.0)]));
    finish(&mut state, Err(Cancelled.into()));
    assert!(state.error.is_none());
    assert_eq!(state.rows.len(), 1);
}

#[test]
fn superseded_outcome_does_not_touch_state() {
    let mut state = AppState::new();
    let stale = state.poll.begin_cycle().expect("cycle 1");
    let current = state.poll.begin_cycle().expect("cycle 2");

    apply_delta(
        &mut state,
        Delta::CycleFinished(CycleOutcome {
            ticket: stale,
            result: Ok(vec![row("stale", 9.0, 9.0)]),
        }),
    );
    assert!(state.rows.is_empty());
    assert!(state.loading);

    apply_delta(
        &mut state,
        Delta::CycleFinished(CycleOutcome {
            ticket: current,
            result: Ok(vec![row("fresh", 1.0, 0.0)]),
        }),
    );
    assert_eq!(state.rows.len(), 1);
    assert_eq!(state.rows[0].id, "fresh");
}

#[test]
fn nothing_applies_after_teardown() {
    let mut state = AppState::new();
    let ticket = state.poll.begin_cycle().expect("cycle");
    state.poll.teardown();
    let logs_before = state.logs.len();

    apply_delta(
        &mut state,
        Delta::CycleFinished(CycleOutcome {
            ticket,
            result: Ok(vec![row("1", 1.0, 1.0)]),
        }),
    );
    apply_delta(&mut state, Delta::Log("[INFO] late".to_string()));

    assert!(state.rows.is_empty());
    assert_eq!(state.logs.len(), logs_before);
}
