use serde::{Deserialize, Serialize};

use crate::ui_constants::columns;

/// Tri-state visibility filter bound to the display select.
#[derive(strum::EnumCount, strum::EnumIter, strum::Display, PartialEq, Eq, Clone, Copy, Default, Debug)]
pub enum DisplayFilter {
    #[default]
    Any,
    Visible,
    Hidden,
}

impl DisplayFilter {
    // Value the listing endpoint expects in the `display` parameter
    pub fn api_value(&self) -> &'static str {
        match self {
            DisplayFilter::Any => "",
            DisplayFilter::Visible => "true",
            DisplayFilter::Hidden => "false",
        }
    }

    /// Map a raw select value back to the filter. Unknown values mean "any".
    pub fn from_control(value: &str) -> Self {
        match value.trim() {
            "true" => DisplayFilter::Visible,
            "false" => DisplayFilter::Hidden,
            _ => DisplayFilter::Any,
        }
    }

    // Text the display cell carries for rows matching this filter
    pub fn cell_marker(&self) -> Option<&'static str> {
        match self {
            DisplayFilter::Any => None,
            DisplayFilter::Visible => Some("visible"),
            DisplayFilter::Hidden => Some("hidden"),
        }
    }
}

/// The two products-table layouts the server renders.
#[derive(strum::EnumCount, strum::EnumIter, strum::Display, PartialEq, Eq, Clone, Copy, Default, Debug)]
pub enum TableVariant {
    /// No branch selected: the branch column is shown.
    #[default]
    AllBranches,
    /// A single branch is selected: the branch column is dropped.
    SingleBranch,
}

impl TableVariant {
    pub fn column_count(&self) -> usize {
        match self {
            TableVariant::AllBranches => columns::ALL_BRANCHES_COUNT,
            TableVariant::SingleBranch => columns::SINGLE_BRANCH_COUNT,
        }
    }

    pub fn for_branch(branch_id: &str) -> Self {
        if branch_id.trim().is_empty() {
            TableVariant::AllBranches
        } else {
            TableVariant::SingleBranch
        }
    }
}

/// Form controls the controller reads and resets.
#[derive(strum::EnumCount, strum::EnumIter, strum::Display, PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum FilterControl {
    Search,
    Category,
    Display,
    PerPage,
    Branch,
}

impl FilterControl {
    /// Free-text controls are debounced, selects fire immediately.
    pub fn is_text(&self) -> bool {
        matches!(self, FilterControl::Search)
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum InputKind {
    KeyUp,
    Enter,
    Change,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct FilterEvent {
    pub control: FilterControl,
    pub kind: InputKind,
}

impl FilterEvent {
    pub fn new(control: FilterControl, kind: InputKind) -> Self {
        Self { control, kind }
    }
}

/// Named regions of a result fragment that get spliced into the live page.
#[derive(strum::EnumCount, strum::EnumIter, strum::Display, PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Region {
    TableBody,
    Pagination,
    ResultCount,
}

#[derive(strum::EnumIter, strum::Display, PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum TableKind {
    Products,
    Categories,
}

/// Whether product filters hit the server or only toggle rows in-page.
#[derive(strum::EnumIter, strum::Display, PartialEq, Eq, Clone, Copy, Default, Debug, Serialize, Deserialize)]
pub enum FilterMode {
    #[serde(rename = "remote")]
    #[default]
    Remote,
    #[serde(rename = "local")]
    Local,
}

#[derive(strum::Display, PartialEq, Eq, Clone, Copy, Debug)]
pub enum Phase {
    Idle,
    Debouncing,
    Fetching,
}
