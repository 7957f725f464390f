use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{ControllerConfig, LiveFilter, Trigger};
use crate::parser::{FetchError, Fetcher};
use crate::types::{FilterControl, FilterEvent, FilterMode, InputKind, Phase, Region, TableKind};
use crate::views::{HtmlPage, Page};

const PRODUCTS: &str = include_str!("../views/fixtures/products.html");
const CATEGORIES: &str = include_str!("../views/fixtures/categories.html");
const RESULTS_SEARCH: &str = include_str!("../views/fixtures/results_search.html");
const RESULTS_PAGE2: &str = include_str!("../views/fixtures/results_page2.html");

const WAIT: Duration = Duration::from_secs(5);

type Route = (u64, Result<String, String>);

/// Scripted fetcher: per-URL delay and outcome, records every call.
#[derive(Clone, Default)]
struct MockFetcher {
    routes: Arc<Mutex<HashMap<String, Route>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    fn respond(&self, url: &str, delay_ms: u64, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), (delay_ms, Ok(body.to_string())));
    }

    fn fail(&self, url: &str, delay_ms: u64, reason: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), (delay_ms, Err(reason.to_string())));
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, target: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(target.to_string());
        let route = self.routes.lock().unwrap().get(target).cloned();
        match route {
            Some((delay_ms, outcome)) => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                outcome.map_err(FetchError::Failed)
            }
            None => Err(FetchError::Failed(format!("no route for {target}"))),
        }
    }
}

fn controller_with(
    html: &str,
    location: &str,
    config: ControllerConfig,
) -> (LiveFilter<HtmlPage, MockFetcher>, MockFetcher) {
    let page = HtmlPage::parse(html, location, &config).unwrap();
    let fetcher = MockFetcher::default();
    let mut ctl = LiveFilter::new(page, fetcher.clone(), config).unwrap();
    ctl.attach();
    (ctl, fetcher)
}

fn products() -> (LiveFilter<HtmlPage, MockFetcher>, MockFetcher) {
    controller_with(PRODUCTS, "/products", ControllerConfig::default())
}

fn ev(control: FilterControl, kind: InputKind) -> FilterEvent {
    FilterEvent::new(control, kind)
}

fn names(page: &HtmlPage, table: TableKind, col: usize) -> Vec<String> {
    page.visible_rows(table)
        .iter()
        .map(|r| r.cells[col].clone())
        .collect()
}

#[test]
fn category_keyup_filters_by_name_or_description() {
    let (mut ctl, fetcher) = controller_with(CATEGORIES, "/categories", ControllerConfig::default());

    assert_eq!(ctl.on_category_keyup("fruit"), Some(1));
    assert_eq!(names(ctl.page(), TableKind::Categories, 1), ["Produce"]);

    assert_eq!(ctl.on_category_keyup("DAIRY"), Some(1));
    assert_eq!(names(ctl.page(), TableKind::Categories, 1), ["Dairy"]);

    assert_eq!(ctl.on_category_keyup(""), Some(2));
    assert!(fetcher.calls().is_empty());
}

#[test]
fn category_visibility_matches_substring_rule_for_every_term() {
    let (mut ctl, _) = controller_with(CATEGORIES, "/categories", ControllerConfig::default());
    for term in ["", "a", "AND", "milk", "veg", "x", "e", "dairy produce", " and "] {
        ctl.on_category_keyup(term);
        let lower = term.to_lowercase();
        for row in ctl.page().rows(TableKind::Categories) {
            let expected = row.cells[1].to_lowercase().contains(&lower)
                || row.cells[2].to_lowercase().contains(&lower);
            assert_eq!(row.visible, expected, "term {term:?} row {:?}", row.cells);
        }
    }
}

#[test]
fn category_term_equal_to_row_text_keeps_row_visible() {
    let html = CATEGORIES.replace("Fruit and veg", "ΟΔΟΣ");
    let (mut ctl, _) = controller_with(&html, "/categories", ControllerConfig::default());

    assert_eq!(ctl.on_category_keyup("ΟΔΟΣ"), Some(1));
    assert_eq!(names(ctl.page(), TableKind::Categories, 1), ["Produce"]);
    assert_eq!(ctl.on_category_keyup("οδοσ"), Some(1));
}

#[test]
fn select_change_dispatches_canonical_query() {
    let (mut ctl, fetcher) = products();
    let url = "/products?search=abc&display=true&per_page=10";
    fetcher.respond(url, 0, RESULTS_SEARCH);

    ctl.page_mut().set_control_value(FilterControl::Search, "abc");
    ctl.page_mut().set_control_value(FilterControl::Display, "true");
    let trigger = ctl.on_filter_input(ev(FilterControl::Display, InputKind::Change), Instant::now());

    assert!(matches!(trigger, Trigger::Dispatched(1)));
    assert!(ctl.wait_incoming(WAIT));
    assert_eq!(fetcher.calls(), [url]);
}

#[test]
fn keystrokes_within_window_trigger_one_search() {
    let (mut ctl, fetcher) = products();
    fetcher.respond("/products?search=gouda&per_page=10", 0, RESULTS_SEARCH);

    let t0 = Instant::now();
    for (i, typed) in ["g", "go", "gou", "goud", "gouda"].iter().enumerate() {
        ctl.page_mut().set_control_value(FilterControl::Search, typed);
        let at = t0 + Duration::from_millis(100 * i as u64);
        let trigger = ctl.on_filter_input(ev(FilterControl::Search, InputKind::KeyUp), at);
        assert_eq!(trigger, Trigger::Debounced(at + Duration::from_millis(500)));
        assert_eq!(ctl.phase(), Phase::Debouncing);
    }

    // 500ms after the first key but only 100ms after the last one
    assert_eq!(ctl.tick(t0 + Duration::from_millis(500)), None);
    assert_eq!(ctl.tick(t0 + Duration::from_millis(900)), Some(1));
    assert_eq!(ctl.tick(t0 + Duration::from_millis(2000)), None);

    assert!(ctl.wait_incoming(WAIT));
    assert_eq!(fetcher.calls(), ["/products?search=gouda&per_page=10"]);
    assert_eq!(ctl.phase(), Phase::Idle);
}

#[test]
fn enter_and_select_change_bypass_debounce() {
    let (mut ctl, fetcher) = products();
    fetcher.respond("/products?search=br&per_page=10", 0, RESULTS_SEARCH);
    fetcher.respond("/products?search=br&category=1&per_page=10", 0, RESULTS_SEARCH);

    let t0 = Instant::now();
    ctl.page_mut().set_control_value(FilterControl::Search, "br");
    ctl.on_filter_input(ev(FilterControl::Search, InputKind::KeyUp), t0);
    assert_eq!(ctl.phase(), Phase::Debouncing);

    let trigger = ctl.on_filter_input(ev(FilterControl::Search, InputKind::Enter), t0);
    assert_eq!(trigger, Trigger::Dispatched(1));
    assert_ne!(ctl.phase(), Phase::Debouncing);
    assert_eq!(ctl.tick(t0 + Duration::from_secs(1)), None);
    assert!(ctl.wait_incoming(WAIT));

    ctl.page_mut().set_control_value(FilterControl::Category, "1");
    ctl.on_filter_input(ev(FilterControl::Search, InputKind::KeyUp), t0);
    let trigger = ctl.on_filter_input(ev(FilterControl::Category, InputKind::Change), t0);
    assert_eq!(trigger, Trigger::Dispatched(2));
    assert_eq!(ctl.next_deadline(), None);
    assert!(ctl.wait_incoming(WAIT));

    assert_eq!(
        fetcher.calls(),
        [
            "/products?search=br&per_page=10",
            "/products?search=br&category=1&per_page=10"
        ]
    );
}

#[test]
fn keyup_on_select_is_ignored() {
    let (mut ctl, fetcher) = products();
    let trigger = ctl.on_filter_input(ev(FilterControl::PerPage, InputKind::KeyUp), Instant::now());
    assert_eq!(trigger, Trigger::Ignored);
    assert_eq!(ctl.phase(), Phase::Idle);
    assert!(fetcher.calls().is_empty());
}

#[test]
fn pending_fetch_shows_one_placeholder_row() {
    let (mut ctl, fetcher) = products();
    fetcher.respond("/products?per_page=10", 300, RESULTS_SEARCH);

    ctl.on_filter_input(ev(FilterControl::Category, InputKind::Change), Instant::now());
    assert_eq!(ctl.phase(), Phase::Fetching);
    let rows = ctl.page().rows(TableKind::Products);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cells.len(), 1);
    let body = ctl.page().region_html(Region::TableBody).unwrap();
    assert!(body.contains(r#"colspan="11""#), "{body}");

    assert!(ctl.wait_incoming(WAIT));
    assert_eq!(names(ctl.page(), TableKind::Products, 2), ["Gouda"]);
}

#[test]
fn placeholder_narrows_when_branch_selected() {
    let (mut ctl, fetcher) = products();
    fetcher.respond("/products?per_page=10&branch_id=1", 300, RESULTS_SEARCH);

    ctl.page_mut().set_control_value(FilterControl::Branch, "1");
    ctl.on_filter_input(ev(FilterControl::Branch, InputKind::Change), Instant::now());
    let body = ctl.page().region_html(Region::TableBody).unwrap();
    assert!(body.contains(r#"colspan="10""#), "{body}");
    assert!(ctl.wait_incoming(WAIT));
}

#[test]
fn success_patches_present_regions_and_pushes_history() {
    let (mut ctl, fetcher) = products();
    let url = "/products?search=gouda&per_page=10";
    fetcher.respond(url, 0, RESULTS_SEARCH);
    let pagination_before = ctl.page().region_html(Region::Pagination);

    ctl.page_mut().set_control_value(FilterControl::Search, "gouda");
    ctl.on_filter_input(ev(FilterControl::Search, InputKind::Enter), Instant::now());
    assert!(ctl.wait_incoming(WAIT));

    let page = ctl.page();
    assert_eq!(names(page, TableKind::Products, 2), ["Gouda"]);
    assert!(page
        .region_html(Region::ResultCount)
        .unwrap()
        .contains("1 to 1 of 1"));
    // The response has no pagination block, so the live one stays
    assert_eq!(page.region_html(Region::Pagination), pagination_before);
    assert_eq!(page.history(), [url]);
    assert_eq!(page.location(), url);
    assert!(page.navigations().is_empty());
    assert_eq!(ctl.last_url(), Some(url));
    assert_eq!(ctl.phase(), Phase::Idle);
}

#[test]
fn failed_fetch_falls_back_to_navigation() {
    let (mut ctl, fetcher) = products();
    let url = "/products?search=zzz&per_page=10";
    fetcher.fail(url, 0, "connection reset");

    ctl.page_mut().set_control_value(FilterControl::Search, "zzz");
    ctl.on_filter_input(ev(FilterControl::Search, InputKind::Enter), Instant::now());
    assert!(ctl.wait_incoming(WAIT));

    assert_eq!(ctl.page().navigations(), [url]);
    assert!(ctl.page().history().is_empty());
    assert!(ctl.last_error().unwrap().contains("connection reset"));
    assert_eq!(ctl.phase(), Phase::Idle);
}

#[test]
fn non_listing_response_falls_back_to_navigation() {
    let (mut ctl, fetcher) = products();
    fetcher.respond("/products?per_page=10", 0, "<form id=\"login\"></form>");

    ctl.clear_filters();
    assert!(ctl.wait_incoming(WAIT));
    assert_eq!(ctl.page().navigations(), ["/products?per_page=10"]);
}

#[test]
fn late_response_to_older_query_is_discarded() {
    let (mut ctl, fetcher) = products();
    let slow = "/products?search=brie&per_page=10";
    let fast = "/products?search=gouda&per_page=10";
    fetcher.respond(slow, 400, RESULTS_PAGE2);
    fetcher.respond(fast, 0, RESULTS_SEARCH);

    ctl.page_mut().set_control_value(FilterControl::Search, "brie");
    let first = ctl.on_filter_input(ev(FilterControl::Search, InputKind::Enter), Instant::now());
    ctl.page_mut().set_control_value(FilterControl::Search, "gouda");
    let second = ctl.on_filter_input(ev(FilterControl::Search, InputKind::Enter), Instant::now());
    assert_eq!((first, second), (Trigger::Dispatched(1), Trigger::Dispatched(2)));

    assert!(ctl.wait_incoming(WAIT));
    assert_eq!(names(ctl.page(), TableKind::Products, 2), ["Gouda"]);

    // Let the slow one land, then drain it
    std::thread::sleep(Duration::from_millis(700));
    assert_eq!(ctl.poll_incoming(), 0);
    assert_eq!(names(ctl.page(), TableKind::Products, 2), ["Gouda"]);
    assert_eq!(ctl.page().history(), [fast]);
    assert_eq!(fetcher.calls().len(), 2);
}

#[test]
fn pagination_click_fetches_link_and_filter_change_resets_page() {
    let (mut ctl, fetcher) = products();
    fetcher.respond("/products?page=2", 0, RESULTS_PAGE2);
    fetcher.respond("/products?search=ched&per_page=10", 0, RESULTS_SEARCH);

    assert_eq!(ctl.on_pagination_click("?page=2"), Some(1));
    assert_eq!(ctl.filters().page, 2);
    assert!(ctl.wait_incoming(WAIT));

    assert_eq!(names(ctl.page(), TableKind::Products, 2), ["Cheddar"]);
    assert!(ctl
        .page()
        .region_html(Region::Pagination)
        .unwrap()
        .contains("page=2"));
    assert_eq!(ctl.page().history(), ["/products?page=2"]);

    ctl.page_mut().set_control_value(FilterControl::Search, "ched");
    ctl.on_filter_input(ev(FilterControl::Search, InputKind::Enter), Instant::now());
    assert_eq!(ctl.filters().page, 1);
    assert!(ctl.wait_incoming(WAIT));
    assert_eq!(fetcher.calls()[1], "/products?search=ched&per_page=10");
}

#[test]
fn empty_pagination_href_keeps_default_navigation() {
    let (mut ctl, fetcher) = products();
    assert_eq!(ctl.on_pagination_click("  "), None);
    assert!(fetcher.calls().is_empty());
}

#[test]
fn clear_filters_twice_is_same_as_once() {
    let (mut ctl, fetcher) = products();
    fetcher.respond("/products?per_page=10", 0, RESULTS_SEARCH);

    ctl.page_mut().set_control_value(FilterControl::Search, "brie");
    ctl.page_mut().set_control_value(FilterControl::Category, "1");
    ctl.page_mut().set_control_value(FilterControl::Display, "false");

    assert_eq!(ctl.clear_filters(), Trigger::Dispatched(1));
    assert!(ctl.wait_incoming(WAIT));
    let once: Vec<_> = ctl.page().visible_rows(TableKind::Products).into_iter().cloned().collect();
    let filters_once = ctl.filters();

    assert_eq!(ctl.clear_filters(), Trigger::Dispatched(2));
    assert!(ctl.wait_incoming(WAIT));
    let twice: Vec<_> = ctl.page().visible_rows(TableKind::Products).into_iter().cloned().collect();

    assert_eq!(once, twice);
    assert_eq!(filters_once, ctl.filters());
    assert_eq!(ctl.filters().search, "");
    assert_eq!(ctl.filters().per_page, "10");
    assert_eq!(fetcher.calls(), ["/products?per_page=10", "/products?per_page=10"]);
}

#[test]
fn detached_controller_ignores_events_and_late_responses() {
    let (mut ctl, fetcher) = products();
    fetcher.respond("/products?per_page=10", 300, RESULTS_PAGE2);

    let t0 = Instant::now();
    ctl.on_filter_input(ev(FilterControl::Category, InputKind::Change), t0);
    ctl.on_filter_input(ev(FilterControl::Search, InputKind::KeyUp), t0);
    ctl.detach();
    assert!(!ctl.is_attached());
    assert_eq!(ctl.phase(), Phase::Idle);

    assert_eq!(ctl.tick(t0 + Duration::from_secs(1)), None);
    assert_eq!(ctl.on_category_keyup("x"), None);
    assert_eq!(ctl.clear_filters(), Trigger::Ignored);
    assert_eq!(
        ctl.on_filter_input(ev(FilterControl::Search, InputKind::Enter), t0),
        Trigger::Ignored
    );

    std::thread::sleep(Duration::from_millis(600));
    assert_eq!(ctl.poll_incoming(), 0);
    assert!(ctl.page().history().is_empty());
    assert_eq!(fetcher.calls().len(), 1);
}

#[test]
fn detach_mid_fetch_restores_table_rows() {
    let (mut ctl, fetcher) = products();
    fetcher.respond("/products?per_page=10", 300, RESULTS_SEARCH);
    fetcher.respond("/products?search=g&per_page=10", 300, RESULTS_SEARCH);
    let body_before = ctl.page().region_html(Region::TableBody);

    ctl.on_filter_input(ev(FilterControl::Category, InputKind::Change), Instant::now());
    ctl.page_mut().set_control_value(FilterControl::Search, "g");
    ctl.on_filter_input(ev(FilterControl::Search, InputKind::Enter), Instant::now());
    assert_eq!(ctl.page().rows(TableKind::Products).len(), 1);

    ctl.detach();
    assert_eq!(ctl.page().region_html(Region::TableBody), body_before);
    assert_eq!(names(ctl.page(), TableKind::Products, 2), ["Gouda", "Brie", "Apple"]);

    std::thread::sleep(Duration::from_millis(600));
    assert_eq!(ctl.poll_incoming(), 0);
    assert_eq!(ctl.page().region_html(Region::TableBody), body_before);
}

#[test]
fn local_mode_filters_rows_without_network() {
    let config = ControllerConfig {
        mode: FilterMode::Local,
        ..ControllerConfig::default()
    };
    let (mut ctl, fetcher) = controller_with(PRODUCTS, "/products", config);
    let now = Instant::now();

    ctl.page_mut().set_control_value(FilterControl::Search, "dy-00");
    let trigger = ctl.on_filter_input(ev(FilterControl::Search, InputKind::KeyUp), now);
    assert_eq!(trigger, Trigger::Filtered(2));
    assert_eq!(names(ctl.page(), TableKind::Products, 2), ["Gouda", "Brie"]);

    ctl.page_mut().set_control_value(FilterControl::Display, "false");
    let trigger = ctl.on_filter_input(ev(FilterControl::Display, InputKind::Change), now);
    assert_eq!(trigger, Trigger::Filtered(1));
    assert_eq!(names(ctl.page(), TableKind::Products, 2), ["Brie"]);

    ctl.page_mut().set_control_value(FilterControl::Search, "");
    ctl.page_mut().set_control_value(FilterControl::Display, "");
    ctl.page_mut().set_control_value(FilterControl::Category, "produce");
    ctl.on_filter_input(ev(FilterControl::Category, InputKind::Change), now);
    assert_eq!(names(ctl.page(), TableKind::Products, 2), ["Apple"]);

    assert_eq!(ctl.clear_filters(), Trigger::Filtered(3));
    assert_eq!(ctl.on_pagination_click("/products?page=2"), None);
    assert!(fetcher.calls().is_empty());
    assert_eq!(ctl.phase(), Phase::Idle);
}

#[test]
fn starting_location_sets_current_page() {
    let (ctl, _) = controller_with(PRODUCTS, "/products?page=3", ControllerConfig::default());
    assert_eq!(ctl.filters().page, 3);
    assert_eq!(ctl.current_target(), "/products?per_page=10&page=3");
}
