//! Multi-page `products.json` fetch loop for `StorefrontClient`.

use std::collections::HashSet;
use std::time::Duration;

use teadb_core::AppConfig;

use crate::error::ScraperError;
use crate::pagination::{next_page, PageRequest};
use crate::types::ShopifyProduct;

use super::{StorefrontClient, PRODUCTS_PAGE_LIMIT};

/// Paging and pacing for a full catalog fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Products requested per page.
    pub limit: u32,
    /// Delay between consecutive page requests, in milliseconds.
    pub inter_request_delay_ms: u64,
    /// Hard cap on pages per catalog walk.
    ///
    /// Each page may be retried up to `max_retries` times, so the worst-case
    /// request count is `max_pages * (1 + max_retries)`.
    pub max_pages: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            limit: PRODUCTS_PAGE_LIMIT,
            inter_request_delay_ms: 500,
            max_pages: 50,
        }
    }
}

impl FetchOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            limit: PRODUCTS_PAGE_LIMIT,
            inter_request_delay_ms: config.scraper_inter_request_delay_ms,
            max_pages: config.scraper_max_pages,
        }
    }
}

impl StorefrontClient {
    /// Fetches every product of a store, or of one collection, by walking
    /// pages until the storefront signals the end.
    ///
    /// Paging follows `Link` cursors when the server sends them and falls back
    /// to `page=N` otherwise (see [`next_page`]). Products already seen on an
    /// earlier page are skipped; a full page that adds nothing new means the
    /// store ignores the page parameter, and the walk stops there.
    ///
    /// **All-or-nothing semantics**: on any page failure (network error, rate
    /// limit, pagination limit), already-fetched products are discarded and the
    /// error is returned, so a failed vendor performs no writes.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_products_page`].
    /// Returns [`ScraperError::PaginationLimit`] if the walk needs more than
    /// `options.max_pages` pages.
    pub async fn fetch_all_products(
        &self,
        store_url: &str,
        collection: Option<&str>,
        options: &FetchOptions,
    ) -> Result<Vec<ShopifyProduct>, ScraperError> {
        let mut all_products: Vec<ShopifyProduct> = Vec::new();
        let mut seen_ids: HashSet<i64> = HashSet::new();
        let mut page = PageRequest::Number(1);
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > options.max_pages {
                return Err(ScraperError::PaginationLimit {
                    store_url: store_url.to_owned(),
                    max_pages: options.max_pages,
                });
            }

            if page_count > 1 && options.inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(options.inter_request_delay_ms)).await;
            }

            let (response, link_header) = self
                .fetch_products_page(store_url, collection, options.limit, &page)
                .await?;

            let returned = response.products.len();
            let before = all_products.len();
            all_products.extend(
                response
                    .products
                    .into_iter()
                    .filter(|p| seen_ids.insert(p.id)),
            );

            if returned > 0 && all_products.len() == before {
                tracing::warn!(
                    store_url,
                    collection,
                    page = page_count,
                    "page repeated earlier products; stopping pagination"
                );
                break;
            }

            match next_page(&page, link_header.as_deref(), returned, options.limit) {
                Some(next) => page = next,
                None => break,
            }
        }

        tracing::debug!(
            store_url,
            collection,
            pages = page_count,
            products = all_products.len(),
            "catalog walk complete"
        );
        Ok(all_products)
    }
}
