// Result fragment handling: pull the three patchable regions out of a server response,
// parse table rows, and build the loading placeholder row.

use scraper::{ElementRef, Html, Selector};

use crate::app::config::{ConfigError, ControllerConfig};
use crate::types::Region;

pub fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::Selector {
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })
}

/// Selectors for the regions a fragment may carry, compiled once per controller.
#[derive(Debug, Clone)]
pub struct FragmentSelectors {
    table_body: Selector,
    pagination: Selector,
    result_count: Selector,
}

impl FragmentSelectors {
    pub fn from_config(config: &ControllerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            table_body: compile_selector(&format!("#{} tbody", config.ids.products_table))?,
            pagination: compile_selector(&config.pagination_selector)?,
            result_count: compile_selector(&config.result_count_selector)?,
        })
    }

    pub fn region(&self, region: Region) -> &Selector {
        match region {
            Region::TableBody => &self.table_body,
            Region::Pagination => &self.pagination,
            Region::ResultCount => &self.result_count,
        }
    }
}

/// The patchable parts of a server response. Regions the response lacks are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultFragment {
    pub table_body: Option<String>,
    pub pagination: Option<String>,
    pub result_count: Option<String>,
}

impl ResultFragment {
    pub fn parse(html: &str, selectors: &FragmentSelectors) -> Self {
        let doc = Html::parse_document(html);
        let inner = |region: Region| -> Option<String> {
            doc.select(selectors.region(region))
                .next()
                .map(|el| el.inner_html())
        };
        Self {
            table_body: inner(Region::TableBody),
            pagination: inner(Region::Pagination),
            result_count: inner(Region::ResultCount),
        }
    }

    pub fn region(&self, region: Region) -> Option<&str> {
        match region {
            Region::TableBody => self.table_body.as_deref(),
            Region::Pagination => self.pagination.as_deref(),
            Region::ResultCount => self.result_count.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.table_body.is_none() && self.pagination.is_none() && self.result_count.is_none()
    }
}

/// Trimmed text content of an element.
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Cell texts of every `<tr>` in a table body's inner HTML.
pub fn parse_rows(tbody_html: &str) -> Vec<Vec<String>> {
    let doc = Html::parse_fragment(&format!("<table><tbody>{}</tbody></table>", tbody_html));
    let (Ok(tr), Ok(td)) = (Selector::parse("tr"), Selector::parse("td")) else {
        return Vec::new();
    };
    doc.select(&tr)
        .map(|row| row.select(&td).map(|cell| element_text(&cell)).collect())
        .collect()
}

/// Single row spanning the whole table, shown while a fetch is pending.
pub fn loading_placeholder(columns: usize, text: &str) -> String {
    format!(
        r#"<tr class="loading-row"><td colspan="{}" class="text-center">{}</td></tr>"#,
        columns.max(1),
        escape_text(text)
    )
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"
        <div class="results-count">Showing 2 of 40 products</div>
        <table id="productsTable" class="table">
          <thead><tr><th>#</th><th>Image</th><th>Name</th></tr></thead>
          <tbody>
            <tr><td>1</td><td></td><td>Gouda</td></tr>
            <tr><td>2</td><td></td><td>Brie</td></tr>
          </tbody>
        </table>
    "#;

    fn selectors() -> FragmentSelectors {
        FragmentSelectors::from_config(&ControllerConfig::default()).unwrap()
    }

    #[test]
    fn extracts_present_regions_only() {
        let frag = ResultFragment::parse(RESPONSE, &selectors());
        let body = frag.table_body.as_deref().unwrap();
        assert!(body.contains("Gouda"));
        assert!(!body.contains("<thead"));
        assert_eq!(
            frag.region(Region::ResultCount).map(str::trim),
            Some("Showing 2 of 40 products")
        );
        assert!(frag.pagination.is_none());
        assert!(!frag.is_empty());
    }

    #[test]
    fn unrelated_html_is_empty() {
        let frag = ResultFragment::parse("<p>Session expired</p>", &selectors());
        assert!(frag.is_empty());
    }

    #[test]
    fn rows_and_cells() {
        let frag = ResultFragment::parse(RESPONSE, &selectors());
        let rows = parse_rows(frag.table_body.as_deref().unwrap());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["2", "", "Brie"]);
    }

    #[test]
    fn placeholder_spans_requested_columns() {
        let html = loading_placeholder(11, "Loading <products>");
        let rows = parse_rows(&html);
        assert_eq!(rows, vec![vec!["Loading <products>".to_string()]]);
        assert!(html.contains(r#"colspan="11""#));
    }

    #[test]
    fn bad_selector_is_config_error() {
        let config = ControllerConfig {
            pagination_selector: "<<".to_string(),
            ..ControllerConfig::default()
        };
        let err = FragmentSelectors::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Selector { .. }));
    }
}
