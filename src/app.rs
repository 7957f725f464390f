// Live filter controller: one instance per listing page.
// Input events come in through the `on_*` methods, fetches run on the shared runtime and
// their results are applied to the page from `poll_incoming`/`wait_incoming`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::parser::{query, FragmentSelectors, Fetcher, Query};
use crate::types::{FilterControl, FilterEvent, FilterMode, InputKind, Phase, TableKind};
use crate::views::Page;

pub mod config;
pub mod local_filter;
pub mod state;
mod fetch;
mod runtime;
#[cfg(test)]
mod tests;

pub use config::{load_config_from_disk, save_config_to_disk, ConfigError, ControllerConfig};
pub use runtime::rt;
pub use state::{Completion, DebounceTimer, FiltersState};

use local_filter::ProductMatcher;
use state::NetState;

// Controls that clear_filters empties. Page size is a view preference and survives.
const CLEARED_CONTROLS: [FilterControl; 4] = [
    FilterControl::Search,
    FilterControl::Category,
    FilterControl::Display,
    FilterControl::Branch,
];

/// What an input event led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Controller detached or the event is not one it reacts to.
    Ignored,
    /// A search is scheduled for the returned deadline.
    Debounced(Instant),
    /// A fetch with this sequence number was dispatched.
    Dispatched(u64),
    /// Rows were filtered in-page; this many remain visible.
    Filtered(usize),
}

pub struct LiveFilter<P: Page, F: Fetcher> {
    page: P,
    fetcher: Arc<F>,
    config: ControllerConfig,
    selectors: FragmentSelectors,
    debounce: DebounceTimer,
    net: NetState,
    current_page: u32,
    attached: bool,
}

impl<P: Page, F: Fetcher> LiveFilter<P, F> {
    pub fn new(page: P, fetcher: F, config: ControllerConfig) -> Result<Self, ConfigError> {
        let selectors = FragmentSelectors::from_config(&config)?;
        let debounce = DebounceTimer::new(Duration::from_millis(config.debounce_ms));
        let current_page = query::page_from_href(&page.location()).unwrap_or(1);
        Ok(Self {
            page,
            fetcher: Arc::new(fetcher),
            config,
            selectors,
            debounce,
            net: NetState::new(),
            current_page,
            attached: false,
        })
    }

    pub fn attach(&mut self) {
        if self.attached {
            return;
        }
        self.attached = true;
        log::info!(
            "Live filter attached: location={} mode={} debounce={}ms",
            self.page.location(),
            self.config.mode,
            self.config.debounce_ms
        );
    }

    /// Stop reacting to events. Pending searches are dropped, responses still
    /// in flight will be discarded on arrival and a loading placeholder is
    /// replaced by the rows it covered.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        self.debounce.cancel();
        if self.restore_body() {
            log::debug!("Restored table body hidden by the loading placeholder");
        }
        self.net.next_seq();
        self.net.loading = false;
        log::info!("Live filter detached: {} request(s) abandoned", self.net.in_flight);
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Quick filter of the category table: a row stays visible iff `term` occurs
    /// in its name or description, ignoring case. Returns the visible row count.
    pub fn on_category_keyup(&mut self, term: &str) -> Option<usize> {
        if !self.attached {
            return None;
        }
        let term = local_filter::fold_case(term);
        let visible = self.page.filter_rows(TableKind::Categories, &mut |cells: &[String]| {
            local_filter::category_row_matches(cells, &term)
        });
        log::debug!("Category filter '{}': {} row(s) visible", term, visible);
        Some(visible)
    }

    /// React to a product filter control. Text keystrokes are debounced; Enter and
    /// select changes search at once and drop any pending debounced search.
    pub fn on_filter_input(&mut self, event: FilterEvent, now: Instant) -> Trigger {
        if !self.attached {
            return Trigger::Ignored;
        }
        if self.config.mode == FilterMode::Local {
            return Trigger::Filtered(self.apply_local_filter());
        }

        let immediate = match (event.kind, event.control.is_text()) {
            (InputKind::Enter, _) => true,
            (InputKind::Change, false) => true,
            (InputKind::KeyUp, false) => return Trigger::Ignored,
            (_, true) => false,
        };

        // Any filter change starts over from the first page
        self.current_page = 1;
        if immediate {
            if self.debounce.cancel() {
                log::debug!("Pending search superseded by {:?} on {}", event.kind, event.control);
            }
            Trigger::Dispatched(self.search_now())
        } else {
            Trigger::Debounced(self.debounce.schedule(now))
        }
    }

    /// Fire the debounced search if its deadline has passed.
    pub fn tick(&mut self, now: Instant) -> Option<u64> {
        if !self.attached || !self.debounce.fire_if_due(now) {
            return None;
        }
        Some(self.search_now())
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.due_at()
    }

    /// Load a pagination link as a fragment instead of following it.
    /// `Some` means the default navigation must be suppressed.
    pub fn on_pagination_click(&mut self, href: &str) -> Option<u64> {
        if !self.attached || href.trim().is_empty() || self.config.mode == FilterMode::Local {
            return None;
        }
        let url = query::resolve_href(href.trim(), &self.page.location());
        self.current_page = query::page_from_href(&url).unwrap_or(1);
        self.debounce.cancel();
        Some(self.start_fetch(url))
    }

    /// Empty every filter control, then search once.
    pub fn clear_filters(&mut self) -> Trigger {
        if !self.attached {
            return Trigger::Ignored;
        }
        log::info!("Clearing filters");
        for control in CLEARED_CONTROLS {
            self.page.set_control_value(control, "");
        }
        self.current_page = 1;
        self.debounce.cancel();
        match self.config.mode {
            FilterMode::Local => Trigger::Filtered(self.apply_local_filter()),
            FilterMode::Remote => Trigger::Dispatched(self.search_now()),
        }
    }

    pub fn phase(&self) -> Phase {
        if self.debounce.is_pending() {
            Phase::Debouncing
        } else if self.net.loading {
            Phase::Fetching
        } else {
            Phase::Idle
        }
    }

    pub fn latest_sequence(&self) -> u64 {
        self.net.counter
    }

    pub fn last_error(&self) -> Option<&str> {
        self.net.last_error.as_deref()
    }

    /// URL of the last response that was spliced into the page.
    pub fn last_url(&self) -> Option<&str> {
        self.net.last_url.as_deref()
    }

    /// Filter values as the page currently shows them.
    pub fn filters(&self) -> FiltersState {
        FiltersState::read(&self.page, self.current_page)
    }

    /// Request target the current filters map to.
    pub fn current_target(&self) -> String {
        let path = query::path_of(&self.page.location()).to_string();
        Query::from_filters(&self.filters()).target(&path)
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    fn search_now(&mut self) -> u64 {
        let url = self.current_target();
        self.start_fetch(url)
    }

    fn apply_local_filter(&mut self) -> usize {
        let filters = self.filters();
        let matcher = ProductMatcher::new(&filters.search, &filters.category, filters.display);
        let visible = self
            .page
            .filter_rows(TableKind::Products, &mut |cells: &[String]| matcher.matches(cells));
        log::debug!("Local product filter: {} row(s) visible", visible);
        visible
    }
}
