// Host page abstraction. The controller only talks to the page through `Page`,
// so the same logic runs against a browser binding or the in-memory `HtmlPage`.

use crate::types::{FilterControl, Region, TableKind};

mod html_page;

pub use html_page::{HtmlPage, TableRow};

pub trait Page {
    /// Current value of a bound control, empty when the control is absent.
    fn control_value(&self, control: FilterControl) -> String;

    fn set_control_value(&mut self, control: FilterControl, value: &str);

    fn region_html(&self, region: Region) -> Option<String>;

    /// Replace the contents of a live region. Returns false if the page has no such region.
    fn replace_region(&mut self, region: Region, html: &str) -> bool;

    /// Show or hide each row of `table` by `keep`; `None` leaves a row as it is.
    /// Returns the number of visible rows afterwards.
    fn filter_rows(
        &mut self,
        table: TableKind,
        keep: &mut dyn FnMut(&[String]) -> Option<bool>,
    ) -> usize;

    /// Address-bar URL (path and query).
    fn location(&self) -> String;

    /// Update the address bar without navigating.
    fn push_history(&mut self, url: &str);

    /// Full navigation; the page reloads from the server.
    fn navigate(&mut self, url: &str);
}
