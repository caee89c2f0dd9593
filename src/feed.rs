use std::env;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::livescore_fetch;
use crate::state::{Delta, LiveRow};

pub const POLL_PERIOD: Duration = Duration::from_millis(3000);

const DEFAULT_LIVESCORES_URL: &str = "http://127.0.0.1:3000/api/livescores";

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` only for the call that actually flipped the flag.
    pub fn cancel(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("request superseded")
    }
}

impl std::error::Error for Cancelled {}

pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.is::<Cancelled>()
}

#[derive(Debug, Clone)]
pub struct CycleTicket {
    pub cycle: u64,
    pub token: CancelToken,
}

#[derive(Debug)]
pub struct CycleOutcome {
    pub ticket: CycleTicket,
    pub result: Result<Vec<LiveRow>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    Applied,
    Superseded,
    TornDown,
}

#[derive(Debug)]
pub struct PollController {
    period: Duration,
    next_due: Option<Instant>,
    in_flight: Option<CycleTicket>,
    next_cycle: u64,
    superseded: u64,
    torn_down: bool,
}

impl PollController {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
            in_flight: None,
            next_cycle: 0,
            superseded: 0,
            torn_down: false,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn in_flight(&self) -> Option<&CycleTicket> {
        self.in_flight.as_ref()
    }

    pub fn superseded(&self) -> u64 {
        self.superseded
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // Fires on the first call, then once per elapsed period.
    pub fn poll_due(&mut self, now: Instant) -> Option<CycleTicket> {
        if self.torn_down {
            return None;
        }
        match self.next_due {
            None => self.next_due = Some(now + self.period),
            Some(due) if now >= due => {
                let mut next = due + self.period;
                while next <= now {
                    next += self.period;
                }
                self.next_due = Some(next);
            }
            Some(_) => return None,
        }
        self.begin_cycle()
    }

    pub fn begin_cycle(&mut self) -> Option<CycleTicket> {
        if self.torn_down {
            return None;
        }
        if let Some(previous) = self.in_flight.take()
            && previous.token.cancel()
        {
            self.superseded += 1;
        }
        self.next_cycle += 1;
        let ticket = CycleTicket {
            cycle: self.next_cycle,
            token: CancelToken::new(),
        };
        self.in_flight = Some(ticket.clone());
        Some(ticket)
    }

    pub fn settle(&mut self, ticket: &CycleTicket) -> CommitStatus {
        if self.torn_down {
            return CommitStatus::TornDown;
        }
        let current = self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.cycle == ticket.cycle);
        if !current || ticket.token.is_cancelled() {
            return CommitStatus::Superseded;
        }
        self.in_flight = None;
        CommitStatus::Applied
    }

    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.next_due = None;
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.token.cancel();
        }
    }
}

pub trait LivescoreSource: Send + Sync {
    fn fetch(&self, cancel: &CancelToken) -> Result<Vec<LiveRow>>;
}

#[derive(Debug, Clone)]
pub struct ProxySource {
    url: String,
}

impl ProxySource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn from_env() -> Self {
        let url = env::var("LIVESCORES_URL")
            .ok()
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| DEFAULT_LIVESCORES_URL.to_string());
        Self::new(url)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl LivescoreSource for ProxySource {
    fn fetch(&self, cancel: &CancelToken) -> Result<Vec<LiveRow>> {
        if cancel.is_cancelled() {
            return Err(Cancelled.into());
        }
        let rows = livescore_fetch::fetch_livescores(&self.url)?;
        // The blocking request cannot be interrupted; drop late results here.
        if cancel.is_cancelled() {
            return Err(Cancelled.into());
        }
        Ok(rows)
    }
}

pub fn spawn_cycle(
    source: Arc<dyn LivescoreSource>,
    ticket: CycleTicket,
    tx: Sender<Delta>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let result = if ticket.token.is_cancelled() {
            Err(Cancelled.into())
        } else {
            source.fetch(&ticket.token)
        };
        let _ = tx.send(Delta::CycleFinished(CycleOutcome { ticket, result }));
    })
}
