use scraper::{ElementRef, Html};
use std::collections::HashMap;
use strum::IntoEnumIterator;

use super::Page;
use crate::app::config::{ConfigError, ControllerConfig};
use crate::parser::fragment::{compile_selector, element_text, parse_rows, FragmentSelectors};
use crate::types::{FilterControl, Region, TableKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<String>,
    pub visible: bool,
}

impl TableRow {
    fn from_cells(cells: Vec<String>) -> Self {
        Self { cells, visible: true }
    }
}

/// In-memory model of a rendered listing page: bound controls, patchable regions,
/// table rows with their visibility, and the address bar.
#[derive(Debug, Clone, Default)]
pub struct HtmlPage {
    location: String,
    controls: HashMap<FilterControl, String>,
    regions: HashMap<Region, String>,
    tables: HashMap<TableKind, Vec<TableRow>>,
    history: Vec<String>,
    navigations: Vec<String>,
}

impl HtmlPage {
    pub fn parse(html: &str, location: &str, config: &ControllerConfig) -> Result<Self, ConfigError> {
        let doc = Html::parse_document(html);
        let selectors = FragmentSelectors::from_config(config)?;

        let mut controls = HashMap::new();
        for control in FilterControl::iter() {
            let selector = compile_selector(&format!("#{}", config.ids.control(control)))?;
            if let Some(el) = doc.select(&selector).next() {
                controls.insert(control, control_value(&el)?);
            }
        }

        let mut regions = HashMap::new();
        for region in Region::iter() {
            if let Some(el) = doc.select(selectors.region(region)).next() {
                regions.insert(region, el.inner_html());
            }
        }

        let mut tables = HashMap::new();
        if let Some(body) = regions.get(&Region::TableBody) {
            tables.insert(TableKind::Products, rows_of(body));
        }
        let categories = compile_selector(&format!("#{} tbody", config.ids.categories_table))?;
        if let Some(el) = doc.select(&categories).next() {
            tables.insert(TableKind::Categories, rows_of(&el.inner_html()));
        }

        log::debug!(
            "HtmlPage parsed: location={} controls={} regions={} tables={}",
            location,
            controls.len(),
            regions.len(),
            tables.len()
        );

        Ok(Self {
            location: location.to_string(),
            controls,
            regions,
            tables,
            history: Vec::new(),
            navigations: Vec::new(),
        })
    }

    pub fn has_control(&self, control: FilterControl) -> bool {
        self.controls.contains_key(&control)
    }

    pub fn rows(&self, table: TableKind) -> &[TableRow] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn visible_rows(&self, table: TableKind) -> Vec<&TableRow> {
        self.rows(table).iter().filter(|r| r.visible).collect()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }
}

fn rows_of(tbody_html: &str) -> Vec<TableRow> {
    parse_rows(tbody_html)
        .into_iter()
        .map(TableRow::from_cells)
        .collect()
}

// Inputs carry their value attribute; selects report the selected option, or the first one
// as browsers do.
fn control_value(el: &ElementRef<'_>) -> Result<String, ConfigError> {
    if el.value().name() != "select" {
        return Ok(el.value().attr("value").unwrap_or("").to_string());
    }
    let option = compile_selector("option")?;
    let options: Vec<ElementRef<'_>> = el.select(&option).collect();
    let chosen = options
        .iter()
        .find(|o| o.value().attr("selected").is_some())
        .or(options.first());
    Ok(chosen.map(option_value).unwrap_or_default())
}

fn option_value(option: &ElementRef<'_>) -> String {
    match option.value().attr("value") {
        Some(v) => v.to_string(),
        None => element_text(option),
    }
}

impl Page for HtmlPage {
    fn control_value(&self, control: FilterControl) -> String {
        self.controls.get(&control).cloned().unwrap_or_default()
    }

    fn set_control_value(&mut self, control: FilterControl, value: &str) {
        if let Some(v) = self.controls.get_mut(&control) {
            *v = value.to_string();
        }
    }

    fn region_html(&self, region: Region) -> Option<String> {
        self.regions.get(&region).cloned()
    }

    fn replace_region(&mut self, region: Region, html: &str) -> bool {
        let Some(current) = self.regions.get_mut(&region) else {
            return false;
        };
        *current = html.to_string();
        if region == Region::TableBody {
            self.tables.insert(TableKind::Products, rows_of(html));
        }
        true
    }

    fn filter_rows(
        &mut self,
        table: TableKind,
        keep: &mut dyn FnMut(&[String]) -> Option<bool>,
    ) -> usize {
        let Some(rows) = self.tables.get_mut(&table) else {
            return 0;
        };
        let mut visible = 0;
        for row in rows.iter_mut() {
            if let Some(show) = keep(&row.cells) {
                row.visible = show;
            }
            if row.visible {
                visible += 1;
            }
        }
        visible
    }

    fn location(&self) -> String {
        self.location.clone()
    }

    fn push_history(&mut self, url: &str) {
        self.history.push(url.to_string());
        self.location = url.to_string();
    }

    fn navigate(&mut self, url: &str) {
        self.navigations.push(url.to_string());
        self.location = url.to_string();
    }
}
