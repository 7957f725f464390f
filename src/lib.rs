// Live filter for admin listing pages.
// One controller per page turns filter input into either in-page row filtering or a
// debounced fragment fetch that is spliced back into the page, with the address bar
// kept in sync. Host pages plug in through `views::Page`; fetching goes through
// `parser::Fetcher`.

pub mod app;
pub mod logger;
pub mod parser;
pub mod types;
pub mod ui_constants;
pub mod views;

pub use app::{load_config_from_disk, ConfigError, ControllerConfig, LiveFilter, Trigger};
pub use parser::{FetchError, Fetcher, HttpFetcher, Query, ResultFragment};
pub use types::{FilterControl, FilterEvent, InputKind, Phase};
pub use views::{HtmlPage, Page};
