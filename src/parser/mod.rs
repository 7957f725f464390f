// Request side of the live search: build the listing URL, fetch the result fragment.
// Public API:
//   - Query: canonical query string from a filter snapshot
//   - Fetcher: async source of HTML fragments (HttpFetcher talks to the real server)
//   - ResultFragment / FragmentSelectors: regions extracted from a response
//
// Example:
// let fetcher = HttpFetcher::new(&config)?;
// let html = fetcher.fetch("/products?search=milk").await?;
// let fragment = ResultFragment::parse(&html, &selectors);

use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

use crate::app::config::ControllerConfig;

mod error;
pub mod fragment;
pub mod query;

pub use error::FetchError;
pub use fragment::{FragmentSelectors, ResultFragment};
pub use query::Query;

/// Source of result fragments. `target` is a page-relative URL such as `/products?page=2`.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, target: &str) -> Result<String, FetchError>;
}

/// Fetcher that issues a GET marked as a partial (AJAX) request.
pub struct HttpFetcher {
    client: reqwest::Client,
    base: Url,
    header_name: String,
    header_value: String,
}

impl HttpFetcher {
    pub fn new(config: &ControllerConfig) -> Result<Self, FetchError> {
        let base = Url::parse(&config.base_url).map_err(|source| FetchError::InvalidUrl {
            url: config.base_url.clone(),
            source,
        })?;
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            base,
            header_name: config.ajax_header_name.clone(),
            header_value: config.ajax_header_value.clone(),
        })
    }

    pub fn resolve(&self, target: &str) -> Result<Url, FetchError> {
        self.base.join(target).map_err(|source| FetchError::InvalidUrl {
            url: target.to_string(),
            source,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, target: &str) -> Result<String, FetchError> {
        let url = self.resolve(target)?;
        log::debug!("fetch: GET {}", url);

        let resp = self
            .client
            .get(url.clone())
            .header(self.header_name.as_str(), self.header_value.as_str())
            .header("Accept", "text/html")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            log::warn!("fetch: http status {} for {}", status.as_u16(), url);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.text().await?;
        log::debug!("fetch: {} returned {}B", url, body.len());
        Ok(body)
    }
}
