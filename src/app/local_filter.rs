// In-page row matching: no network, one pass over the rows per keystroke.
//
// Matchers return `None` for rows that lack the cells they inspect; such rows keep
// whatever visibility they already had.

use crate::types::DisplayFilter;
use crate::ui_constants::columns;

/// Lowercase `s` one char at a time, the same folding `contains_ignore_case` applies to
/// the haystack. `str::to_lowercase` is context sensitive (final sigma) and would not match.
pub fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Case-insensitive substring test against a needle already passed through `fold_case`.
/// Compares char by char so no lowercase copy of the haystack is made.
pub fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    if needle_lower.is_empty() {
        return true;
    }
    haystack.char_indices().any(|(start, _)| {
        let mut hay = haystack[start..].chars().flat_map(char::to_lowercase);
        needle_lower.chars().all(|n| hay.next() == Some(n))
    })
}

/// Category row: visible iff the term occurs in its name or description.
pub fn category_row_matches(cells: &[String], term_lower: &str) -> Option<bool> {
    let name = cells.get(columns::CATEGORY_NAME)?;
    let description = cells.get(columns::CATEGORY_DESCRIPTION)?;
    Some(contains_ignore_case(name, term_lower) || contains_ignore_case(description, term_lower))
}

/// Product filter values, lowercased once per event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductMatcher {
    search: String,
    category: String,
    display: DisplayFilter,
}

impl ProductMatcher {
    pub fn new(search: &str, category: &str, display: DisplayFilter) -> Self {
        Self {
            search: fold_case(search),
            category: fold_case(category),
            display,
        }
    }

    pub fn matches(&self, cells: &[String]) -> Option<bool> {
        let name = cells.get(columns::PRODUCT_NAME)?;
        let category = cells.get(columns::PRODUCT_CATEGORY)?;
        let code = cells.get(columns::PRODUCT_CODE)?;
        let display = cells.get(columns::PRODUCT_DISPLAY)?;

        let search_ok = contains_ignore_case(name, &self.search)
            || contains_ignore_case(category, &self.search)
            || contains_ignore_case(code, &self.search);
        let category_ok = self.category.is_empty() || contains_ignore_case(category, &self.category);
        let display_ok = match self.display.cell_marker() {
            Some(marker) => contains_ignore_case(display, marker),
            None => true,
        };
        Some(search_ok && category_ok && display_ok)
    }
}
