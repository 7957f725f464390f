// Controller state split into the filter snapshot, the debounce slot and network bookkeeping.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use crate::parser::FetchError;
use crate::types::{DisplayFilter, FilterControl, TableVariant};
use crate::views::Page;

/// Filter values as currently shown by the page controls.
/// Never stored between events: the page is the source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiltersState {
    pub search: String,
    pub category: String,
    pub display: DisplayFilter,
    pub per_page: String,
    pub branch_id: String,
    pub page: u32,
}

impl Default for FiltersState {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: String::new(),
            display: DisplayFilter::Any,
            per_page: String::new(),
            branch_id: String::new(),
            page: 1,
        }
    }
}

impl FiltersState {
    pub fn read<P: Page + ?Sized>(page: &P, current_page: u32) -> Self {
        Self {
            search: page.control_value(FilterControl::Search),
            category: page.control_value(FilterControl::Category),
            display: DisplayFilter::from_control(&page.control_value(FilterControl::Display)),
            per_page: page.control_value(FilterControl::PerPage),
            branch_id: page.control_value(FilterControl::Branch),
            page: current_page.max(1),
        }
    }

    pub fn variant(&self) -> TableVariant {
        TableVariant::for_branch(&self.branch_id)
    }
}

/// Single-slot deferred search. Scheduling again replaces the pending deadline.
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    delay: Duration,
    due_at: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, due_at: None }
    }

    pub fn schedule(&mut self, now: Instant) -> Instant {
        let due = now + self.delay;
        self.due_at = Some(due);
        due
    }

    /// Drop the pending invocation. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.due_at.take().is_some()
    }

    /// Consume the pending invocation if its deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.due_at {
            Some(due) if now >= due => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    pub fn due_at(&self) -> Option<Instant> {
        self.due_at
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Outcome of one dispatched fetch, sent back from the runtime.
#[derive(Debug)]
pub struct Completion {
    pub seq: u64,
    pub url: String,
    pub result: Result<String, FetchError>,
}

pub struct NetState {
    // Sequence of the most recently dispatched request
    pub counter: u64,
    // Latest request still unresolved
    pub loading: bool,
    pub in_flight: usize,
    pub tx: mpsc::Sender<Completion>,
    pub rx: mpsc::Receiver<Completion>,
    pub last_url: Option<String>,
    pub last_error: Option<String>,
    // Table body as it was before the loading placeholder went in
    pub body_before_fetch: Option<String>,
}

impl NetState {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            counter: 0,
            loading: false,
            in_flight: 0,
            tx,
            rx,
            last_url: None,
            last_error: None,
            body_before_fetch: None,
        }
    }

    /// Allocate the next request sequence.
    pub fn next_seq(&mut self) -> u64 {
        self.counter = self.counter.wrapping_add(1);
        self.counter
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.counter
    }
}

impl Default for NetState {
    fn default() -> Self {
        Self::new()
    }
}
