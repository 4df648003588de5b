//! Debounced autosave scheduling
//!
//! The scheduler never performs I/O itself. The owner calls
//! [`Debouncer::touch`] on every edit and [`Debouncer::take_due`] from its
//! tick; a save fires only after the debounce window passes with no further
//! edits. Time comes from an injected [`Clock`] so tests can step it.
//!
//! Saves are numbered by [`SaveSequencer`]. A response is applied only if it
//! belongs to a save issued after the last applied one, so a slow response
//! can never roll back newer state.

use chrono::{NaiveDate, Utc};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of time for debouncing and date rules
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Hand-driven clock for tests
#[derive(Debug, Clone)]
pub struct ManualClock {
    start: Instant,
    state: Arc<Mutex<ManualState>>,
}

#[derive(Debug)]
struct ManualState {
    elapsed: Duration,
    today: NaiveDate,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            start: Instant::now(),
            state: Arc::new(Mutex::new(ManualState {
                elapsed: Duration::ZERO,
                today,
            })),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut state) = self.state.lock() {
            state.elapsed += by;
        }
    }

    pub fn set_today(&self, today: NaiveDate) {
        if let Ok(mut state) = self.state.lock() {
            state.today = today;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let elapsed = self.state.lock().map(|s| s.elapsed).unwrap_or_default();
        self.start + elapsed
    }

    fn today(&self) -> NaiveDate {
        match self.state.lock() {
            Ok(state) => state.today,
            Err(poisoned) => poisoned.into_inner().today,
        }
    }
}

/// Single resettable timer
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// (Re)start the timer from `now`
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once per expiry; the timer is disarmed when it fires
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Monotonic save numbering with stale-response rejection
#[derive(Debug, Clone, Default)]
pub struct SaveSequencer {
    issued: u64,
    applied: u64,
}

impl SaveSequencer {
    /// Number for a new outgoing save
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Whether the response to save `seq` may be applied; records it if so
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.applied || seq > self.issued {
            return false;
        }
        self.applied = seq;
        true
    }

    pub fn last_applied(&self) -> u64 {
        self.applied
    }

    /// Saves issued but not yet answered (or answered out of order)
    pub fn in_flight(&self) -> u64 {
        self.issued - self.applied
    }
}
