// Canonical query string for the listing endpoint.
//
// Order is fixed: search, category, display, per_page, branch_id, page.
// Empty values are never emitted, and page 1 is the server default so it is left out too.

use url::form_urlencoded;

use crate::app::state::FiltersState;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    pub fn from_filters(filters: &FiltersState) -> Self {
        let mut query = Query::default();
        query.push("search", &filters.search);
        query.push("category", &filters.category);
        query.push("display", filters.display.api_value());
        query.push("per_page", &filters.per_page);
        query.push("branch_id", &filters.branch_id);
        if filters.page > 1 {
            query.push("page", &filters.page.to_string());
        }
        query
    }

    /// Append a pair unless its value is blank.
    pub fn push(&mut self, key: &'static str, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.pairs.push((key, value.to_string()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter().map(|(k, v)| (*k, v.as_str())))
            .finish()
    }

    /// Full request target for `path`, e.g. `/products?search=abc`.
    pub fn target(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, self.to_query_string())
        }
    }
}

/// Path part of a location, without query string or fragment.
pub fn path_of(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    &location[..end]
}

/// `page` parameter of a pagination link, if it carries a valid one.
pub fn page_from_href(href: &str) -> Option<u32> {
    let (_, rest) = href.split_once('?')?;
    let query = rest.split('#').next().unwrap_or("");
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.trim().parse::<u32>().ok())
        .filter(|p| *p > 0)
}

/// Resolve a pagination href against the current location path.
/// Query-only links (`?page=2`) are common in server-rendered pagination.
pub fn resolve_href(href: &str, location: &str) -> String {
    if href.starts_with('?') {
        format!("{}{}", path_of(location), href)
    } else {
        href.to_string()
    }
}
