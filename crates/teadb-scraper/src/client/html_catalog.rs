//! Collection crawl and product-page fetches for static HTML vendors.

use std::collections::HashSet;
use std::time::Duration;

use teadb_core::Transient;

use crate::error::ScraperError;
use crate::html::{extract_product_detail, extract_product_links};
use crate::types::HtmlProduct;

use super::{collection_url, FetchOptions, StorefrontClient};

/// Extracted product pages plus the count of pages that were skipped.
#[derive(Debug)]
pub struct ProductPages {
    pub products: Vec<HtmlProduct>,
    /// Pages that answered with a permanent error (404, other 4xx).
    pub skipped: usize,
}

impl StorefrontClient {
    /// Product page URLs listed by one collection, across its pages.
    ///
    /// Pages `?page=1, 2, …` are fetched until one lists no URL not already
    /// seen, or a page after the first is 404. Any other page failure returns
    /// the error.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::fetch_html`] errors. Returns
    /// [`ScraperError::PaginationLimit`] if the collection still yields new
    /// links after `options.max_pages` pages.
    pub async fn fetch_collection_links(
        &self,
        store_url: &str,
        handle: &str,
        options: &FetchOptions,
    ) -> Result<Vec<String>, ScraperError> {
        let mut links: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut page: u32 = 0;
        let mut page_count = 0usize;

        loop {
            page += 1;
            page_count += 1;
            if page_count > options.max_pages {
                return Err(ScraperError::PaginationLimit {
                    store_url: collection_url(store_url, handle, 1),
                    max_pages: options.max_pages,
                });
            }

            if page_count > 1 && options.inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(options.inter_request_delay_ms)).await;
            }

            let url = collection_url(store_url, handle, page);
            let html = match self.fetch_html(&url).await {
                Ok(html) => html,
                Err(ScraperError::NotFound { .. }) if page > 1 => {
                    tracing::debug!(store_url, handle, page, "collection page missing, stopping");
                    break;
                }
                Err(e) => return Err(e),
            };
            let before = links.len();
            links.extend(
                extract_product_links(&html, &url)
                    .into_iter()
                    .filter(|link| seen.insert(link.clone())),
            );

            if links.len() == before {
                break;
            }
        }

        tracing::debug!(
            store_url,
            handle,
            pages = page,
            links = links.len(),
            "collection crawled"
        );
        Ok(links)
    }

    /// Fetches and extracts each product page in order, pacing requests by
    /// the inter-request delay.
    ///
    /// A page that fails permanently (a delisted product's 404, a 403) is
    /// logged and counted in [`ProductPages::skipped`].
    ///
    /// # Errors
    ///
    /// Propagates the first transient [`Self::fetch_html`] error that
    /// outlasts the retry policy.
    pub async fn fetch_product_pages(
        &self,
        urls: &[String],
        options: &FetchOptions,
    ) -> Result<ProductPages, ScraperError> {
        let mut pages = ProductPages {
            products: Vec::with_capacity(urls.len()),
            skipped: 0,
        };
        for (idx, url) in urls.iter().enumerate() {
            if idx > 0 && options.inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(options.inter_request_delay_ms)).await;
            }
            match self.fetch_html(url).await {
                Ok(html) => pages.products.push(extract_product_detail(&html, url)),
                Err(e) if !e.is_transient() => {
                    tracing::warn!(url = %url, error = %e, "skipping product page");
                    pages.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(pages)
    }
}
