use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::logger;
use crate::types::{FilterControl, FilterMode};
use crate::ui_constants::{self, markup};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },
}

/// Element ids of the listing page the controller binds to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ElementIds {
    pub product_search: String,
    pub category_filter: String,
    pub display_filter: String,
    pub per_page: String,
    pub branch_filter: String,
    pub category_search: String,
    pub products_table: String,
    pub categories_table: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            product_search: markup::PRODUCT_SEARCH_ID.to_string(),
            category_filter: markup::CATEGORY_FILTER_ID.to_string(),
            display_filter: markup::DISPLAY_FILTER_ID.to_string(),
            per_page: markup::PER_PAGE_ID.to_string(),
            branch_filter: markup::BRANCH_FILTER_ID.to_string(),
            category_search: markup::CATEGORY_SEARCH_ID.to_string(),
            products_table: markup::PRODUCTS_TABLE_ID.to_string(),
            categories_table: markup::CATEGORIES_TABLE_ID.to_string(),
        }
    }
}

impl ElementIds {
    pub fn control(&self, control: FilterControl) -> &str {
        match control {
            FilterControl::Search => &self.product_search,
            FilterControl::Category => &self.category_filter,
            FilterControl::Display => &self.display_filter,
            FilterControl::PerPage => &self.per_page,
            FilterControl::Branch => &self.branch_filter,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    // Origin that page-relative fetch targets are resolved against
    pub base_url: String,
    pub debounce_ms: u64,
    pub mode: FilterMode,
    pub ajax_header_name: String,
    pub ajax_header_value: String,
    // None = rely on the transport's own timeout
    pub request_timeout_secs: Option<u64>,
    pub ids: ElementIds,
    pub pagination_selector: String,
    pub result_count_selector: String,
    pub loading_text: String,
    // Warn+ log lines are appended here when set
    pub log_file: Option<PathBuf>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            debounce_ms: ui_constants::SEARCH_DEBOUNCE_MS,
            mode: FilterMode::Remote,
            ajax_header_name: ui_constants::AJAX_HEADER_NAME.to_string(),
            ajax_header_value: ui_constants::AJAX_HEADER_VALUE.to_string(),
            request_timeout_secs: None,
            ids: ElementIds::default(),
            pagination_selector: markup::PAGINATION_SELECTOR.to_string(),
            result_count_selector: markup::RESULT_COUNT_SELECTOR.to_string(),
            loading_text: ui_constants::LOADING_TEXT.to_string(),
            log_file: None,
        }
    }
}

pub const CONFIG_PATH_ENV: &str = "LIVE_FILTER_CONFIG_PATH";

pub fn config_file_path() -> PathBuf {
    let _ = dotenvy::dotenv();
    if let Ok(p) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(p);
    }
    PathBuf::from("live_filter.json")
}

impl ControllerConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

/// Host startup: read the config file, then install the logger with the file's
/// `log_file`. A missing or broken config keeps the defaults.
pub fn load_config_from_disk() -> ControllerConfig {
    let path = config_file_path();
    let loaded = ControllerConfig::load_from_file(&path);
    let cfg = loaded.as_ref().cloned().unwrap_or_default();
    logger::init(cfg.log_file.as_deref());

    match loaded {
        Ok(_) => log::info!("Loaded live filter config from {}", path.to_string_lossy()),
        Err(e) => log::info!(
            "Using default live filter config; cannot load {}: {}",
            path.to_string_lossy(),
            e
        ),
    }
    cfg
}

pub fn save_config_to_disk(cfg: &ControllerConfig) -> Result<PathBuf, ConfigError> {
    let path = config_file_path();
    match cfg.save_to_file(&path) {
        Ok(()) => {
            log::info!("Saved live filter config to {}", path.to_string_lossy());
            Ok(path)
        }
        Err(e) => {
            log::error!(
                "Failed to save live filter config to {}: {}",
                path.to_string_lossy(),
                e
            );
            Err(e)
        }
    }
}
