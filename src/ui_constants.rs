// Constants for the listing page markup and timing, kept out of the controller body.

/// Debounce delay for the free-text search in milliseconds
pub const SEARCH_DEBOUNCE_MS: u64 = 500;

/// Header the server uses to tell fragment requests from full page loads
pub const AJAX_HEADER_NAME: &str = "X-Requested-With";
pub const AJAX_HEADER_VALUE: &str = "XMLHttpRequest";

/// Placeholder text shown in the table body while a fetch is pending
pub const LOADING_TEXT: &str = "Loading...";

/// Column positions and counts of the listing tables
pub mod columns {
    /// Category table: name column
    pub const CATEGORY_NAME: usize = 1;

    /// Category table: description column
    pub const CATEGORY_DESCRIPTION: usize = 2;

    /// Products table: name column
    pub const PRODUCT_NAME: usize = 2;

    /// Products table: category column
    pub const PRODUCT_CATEGORY: usize = 3;

    /// Products table: product code column
    pub const PRODUCT_CODE: usize = 8;

    /// Products table: display status column ("visible"/"hidden")
    pub const PRODUCT_DISPLAY: usize = 9;

    /// Products table width when every branch is listed
    pub const ALL_BRANCHES_COUNT: usize = 11;

    /// Products table width with a branch selected (branch column dropped)
    pub const SINGLE_BRANCH_COUNT: usize = 10;
}

/// Default element ids and selectors of the listing page
pub mod markup {
    pub const PRODUCT_SEARCH_ID: &str = "productSearch";
    pub const CATEGORY_FILTER_ID: &str = "categoryFilter";
    pub const DISPLAY_FILTER_ID: &str = "displayFilter";
    pub const PER_PAGE_ID: &str = "perPageSelect";
    pub const BRANCH_FILTER_ID: &str = "branchFilter";
    pub const CATEGORY_SEARCH_ID: &str = "categorySearch";
    pub const PRODUCTS_TABLE_ID: &str = "productsTable";
    pub const CATEGORIES_TABLE_ID: &str = "categoriesTable";
    pub const PAGINATION_SELECTOR: &str = ".pagination";
    pub const RESULT_COUNT_SELECTOR: &str = ".results-count";
}
