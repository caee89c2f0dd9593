use std::collections::VecDeque;
use std::fmt;

use crate::feed::{CommitStatus, CycleOutcome, POLL_PERIOD, PollController, is_cancelled};
use crate::json_pick::format_number;

const LOG_CAPACITY: usize = 200;

/// A home/away pair of statistic values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatPair {
    pub home: f64,
    pub away: f64,
}

impl StatPair {
    pub fn new(home: f64, away: f64) -> Self {
        Self { home, away }
    }

    /// Per-side `later - earlier`; may be negative.
    pub fn delta(earlier: StatPair, later: StatPair) -> Self {
        Self {
            home: later.home - earlier.home,
            away: later.away - earlier.away,
        }
    }
}

impl fmt::Display for StatPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}–{}",
            format_number(self.home),
            format_number(self.away)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveRow {
    pub id: String,
    pub match_label: String,
    pub time_label: String,
    pub corners: StatPair,
    pub dangerous_attacks_first_half: StatPair,
    pub dangerous_attacks_second_half: StatPair,
    pub delta: StatPair,
}

#[derive(Debug)]
pub struct AppState {
    pub rows: Vec<LiveRow>,
    pub error: Option<String>,
    // True until the first cycle settles, successfully or not.
    pub loading: bool,
    pub last_updated: Option<String>,
    pub selected: usize,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
    pub poll: PollController,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            error: None,
            loading: true,
            last_updated: None,
            selected: 0,
            help_overlay: false,
            logs: VecDeque::with_capacity(LOG_CAPACITY),
            poll: PollController::new(POLL_PERIOD),
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        if self.logs.len() >= LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(line.into());
    }

    pub fn select_next(&mut self) {
        if self.rows.is_empty() {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(self.rows.len() - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_row(&self) -> Option<&LiveRow> {
        self.rows.get(self.selected)
    }

    fn replace_rows(&mut self, rows: Vec<LiveRow>) {
        let selected_id = self.selected_row().map(|row| row.id.clone());
        self.rows = rows;
        self.selected = selected_id
            .and_then(|id| self.rows.iter().position(|row| row.id == id))
            .unwrap_or(self.selected)
            .min(self.rows.len().saturating_sub(1));
    }
}

#[derive(Debug)]
pub enum Delta {
    CycleFinished(CycleOutcome),
    Log(String),
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    if state.poll.is_torn_down() {
        return;
    }
    match delta {
        Delta::Log(line) => state.push_log(line),
        Delta::CycleFinished(outcome) => {
            if state.poll.settle(&outcome.ticket) != CommitStatus::Applied {
                return;
            }
            match outcome.result {
                Ok(rows) => {
                    if state.error.take().is_some() {
                        state.push_log("[INFO] Live feed recovered");
                    }
                    if state.loading || rows.len() != state.rows.len() {
                        state.push_log(format!("[INFO] {} live fixtures", rows.len()));
                    }
                    state.replace_rows(rows);
                    state.loading = false;
                    state.last_updated = Some(chrono::Local::now().format("%H:%M:%S").to_string());
                }
                Err(err) if is_cancelled(&err) => {}
                Err(err) => {
                    let message = format!("{err:#}");
                    state.push_log(format!("[WARN] Live fetch error: {message}"));
                    state.error = Some(message);
                    state.loading = false;
                }
            }
        }
    }
}
