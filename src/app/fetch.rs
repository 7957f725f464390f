use std::sync::Arc;
use std::time::{Duration, Instant};

use strum::IntoEnumIterator;

use super::rt;
use super::state::{Completion, FiltersState};
use crate::parser::fragment::loading_placeholder;
use crate::parser::{Fetcher, ResultFragment};
use crate::types::Region;
use crate::views::Page;

impl<P: Page, F: Fetcher> super::LiveFilter<P, F> {
    /// Dispatch a fragment request for `url`. Earlier requests are not cancelled;
    /// their responses are dropped when they arrive because their sequence is stale.
    pub(super) fn start_fetch(&mut self, url: String) -> u64 {
        let seq = self.net.next_seq();
        self.show_loading();
        self.net.loading = true;
        self.net.in_flight += 1;
        self.net.last_error = None;

        log::info!("Live search #{seq}: GET {url} ({} in flight)", self.net.in_flight);

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.net.tx.clone();
        rt().spawn(async move {
            let result = fetcher.fetch(&url).await;
            if let Err(err) = &result {
                log::warn!("Live search #{seq} failed: {err}");
            }
            let _ = tx.send(Completion { seq, url, result });
        });
        seq
    }

    // Swap the table body for a single row spanning the active variant's columns.
    // The body seen before the first overlapping fetch is kept for `detach`.
    fn show_loading(&mut self) {
        if self.net.body_before_fetch.is_none() {
            self.net.body_before_fetch = self.page.region_html(Region::TableBody);
        }
        let columns = FiltersState::read(&self.page, self.current_page)
            .variant()
            .column_count();
        let placeholder = loading_placeholder(columns, &self.config.loading_text);
        if !self.page.replace_region(Region::TableBody, &placeholder) {
            log::debug!("No table body on page; loading placeholder skipped");
        }
    }

    /// Apply every completion that has arrived. Returns how many were applied
    /// (stale ones are counted out).
    pub fn poll_incoming(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.net.rx.try_recv() {
            if self.apply_completion(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Block until the latest request resolves or `timeout` passes.
    /// Returns true when nothing is left loading.
    pub fn wait_incoming(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.net.loading {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.net.rx.recv_timeout(remaining) {
                Ok(completion) => {
                    self.apply_completion(completion);
                }
                Err(_) => return false,
            }
        }
        true
    }

    fn apply_completion(&mut self, completion: Completion) -> bool {
        let Completion { seq, url, result } = completion;
        self.net.in_flight = self.net.in_flight.saturating_sub(1);

        if !self.attached || !self.net.is_latest(seq) {
            log::debug!(
                "Discarding stale response #{seq} (latest #{})",
                self.net.counter
            );
            return false;
        }
        self.net.loading = false;
        self.net.body_before_fetch = None;

        let html = match result {
            Ok(html) => html,
            Err(err) => {
                self.fall_back(&url, err.to_string());
                return true;
            }
        };

        let fragment = ResultFragment::parse(&html, &self.selectors);
        if fragment.table_body.is_none() {
            // Not a listing fragment (login page, error page); let the server render it.
            self.fall_back(&url, "response has no results table".to_string());
            return true;
        }

        let mut patched = 0;
        for region in Region::iter() {
            if let Some(content) = fragment.region(region) {
                if self.page.replace_region(region, content) {
                    patched += 1;
                }
            }
        }
        self.page.push_history(&url);
        self.net.last_url = Some(url);
        log::info!("Live search #{seq} applied: {patched} region(s) patched");
        true
    }

    /// Put back the table body the placeholder replaced, if a fetch is still pending.
    pub(super) fn restore_body(&mut self) -> bool {
        match self.net.body_before_fetch.take() {
            Some(body) if self.net.loading => self.page.replace_region(Region::TableBody, &body),
            _ => false,
        }
    }

    fn fall_back(&mut self, url: &str, reason: String) {
        log::warn!("Falling back to full navigation to {url}: {reason}");
        self.net.last_error = Some(reason);
        self.page.navigate(url);
    }
}
