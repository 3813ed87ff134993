//! HTTP client for vendor storefronts: the public `products.json` endpoint
//! and static HTML collection/product pages.

mod fetch_all;
mod html_catalog;
mod origin;

use std::time::Duration;

use reqwest::{Client, Response};
use teadb_core::{retry_with_backoff, AppConfig, RetryPolicy};

use crate::error::ScraperError;
use crate::pagination::PageRequest;
use crate::types::ShopifyProductsResponse;

pub use fetch_all::FetchOptions;
pub use html_catalog::ProductPages;
use origin::extract_domain;
pub use origin::{collection_url, extract_store_origin};

/// Page size requested from `products.json`; the storefront maximum.
pub const PRODUCTS_PAGE_LIMIT: u32 = 250;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP client shared by every vendor fetch in a run.
///
/// Rate limiting (429), not-found (404), and other non-2xx responses surface
/// as typed errors. Transient failures (429, network errors, 5xx) are retried
/// through [`retry_with_backoff`] with the configured policy.
pub struct StorefrontClient {
    pub(super) client: Client,
    pub(super) retry: RetryPolicy,
}

impl StorefrontClient {
    /// Creates a client with the given request timeout, `User-Agent`, and
    /// retry policy. The connect timeout is fixed at 10 s.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, retry })
    }

    /// Builds a client from the `TEADB_SCRAPER_*` settings.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            config.retry_policy(),
        )
    }

    /// Fetches one page of `products.json`, store-wide or scoped to a
    /// collection, and returns the parsed page with its raw `Link` header.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`ScraperError::NotFound`]: HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status (5xx retried, 4xx not).
    /// - [`ScraperError::Http`]: network or TLS failure after all retries exhausted.
    /// - [`ScraperError::Deserialize`]: response body is not valid JSON (not retried).
    pub async fn fetch_products_page(
        &self,
        store_url: &str,
        collection: Option<&str>,
        limit: u32,
        page: &PageRequest,
    ) -> Result<(ShopifyProductsResponse, Option<String>), ScraperError> {
        let url = Self::products_url(store_url, collection, limit, page)?;

        retry_with_backoff(self.retry, || {
            let url = url.clone();
            async move {
                let response = self.send(&url, "application/json").await?;

                // Extract the Link header before consuming the response body.
                let link_header = response
                    .headers()
                    .get(reqwest::header::LINK)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);

                let body = response.text().await?;
                let parsed =
                    serde_json::from_str::<ShopifyProductsResponse>(&body).map_err(|e| {
                        ScraperError::Deserialize {
                            context: format!("products page {url}"),
                            source: e,
                        }
                    })?;

                Ok((parsed, link_header))
            }
        })
        .await
    }

    /// Fetches an HTML page body, with the same status handling and retry
    /// policy as [`Self::fetch_products_page`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_products_page`], minus `Deserialize`.
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        retry_with_backoff(self.retry, || async move {
            let response = self.send(url, "text/html,application/xhtml+xml").await?;
            Ok(response.text().await?)
        })
        .await
    }

    /// Sends one GET and maps non-2xx statuses to typed errors.
    pub(crate) async fn send(&self, url: &str, accept: &str) -> Result<Response, ScraperError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, accept)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(60);

            return Err(ScraperError::RateLimited {
                domain: extract_domain(url),
                retry_after_secs,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response)
    }

    /// Builds the `products.json` URL for a store (or one of its
    /// collections), page size, and page request.
    ///
    /// Cursor requests carry only `limit` and `page_info`; the storefront
    /// rejects `page_info` combined with other filters.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidStoreUrl`] if the extracted origin cannot
    /// be parsed as a valid URL base.
    fn products_url(
        store_url: &str,
        collection: Option<&str>,
        limit: u32,
        page: &PageRequest,
    ) -> Result<String, ScraperError> {
        let origin = extract_store_origin(store_url);
        let base = match collection {
            Some(handle) => format!("{origin}/collections/{}/products.json", handle.trim()),
            None => format!("{origin}/products.json"),
        };
        let mut url = reqwest::Url::parse(&base).map_err(|e| ScraperError::InvalidStoreUrl {
            store_url: store_url.to_owned(),
            reason: format!("origin \"{origin}\" is not a valid URL base: {e}"),
        })?;

        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());

        match page {
            PageRequest::Number(n) => {
                url.query_pairs_mut().append_pair("page", &n.to_string());
            }
            PageRequest::Cursor(cursor) => {
                url.query_pairs_mut().append_pair("page_info", cursor);
            }
        }

        Ok(url.to_string())
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
