//! Vendor-level catalog fetch: picks the fetch path for a vendor's platform,
//! applies the tea filter, and normalizes every surviving product.
//!
//! Listing fetch errors abort the vendor (nothing partial is returned).
//! Product pages that fail permanently and records that fail normalization
//! are logged and counted, and the rest continue.

use std::collections::HashSet;

use teadb_core::{
    CollectionConfig, NormalizedTea, NormalizedTeaware, Platform, TeaType, VendorConfig,
};

use crate::client::{FetchOptions, StorefrontClient};
use crate::error::ScraperError;
use crate::filter::{is_excluded, is_tea_product};
use crate::html::merge_product_urls;
use crate::normalize::{normalize_html_tea, normalize_tea, normalize_teaware};
use crate::types::{HtmlProduct, ShopifyProduct};

/// Normalized records for one vendor plus what was dropped on the way.
#[derive(Debug)]
pub struct FetchedCatalog<T> {
    pub records: Vec<T>,
    /// Listings rejected by the tea filter.
    pub filtered_out: usize,
    /// Listings that could not be fetched or normalized.
    pub invalid: usize,
}

impl<T> Default for FetchedCatalog<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            filtered_out: 0,
            invalid: 0,
        }
    }
}

impl<T> FetchedCatalog<T> {
    fn push_normalized(&mut self, vendor: &VendorConfig, result: Result<T, ScraperError>) {
        match result {
            Ok(record) => self.records.push(record),
            Err(e) => {
                tracing::warn!(vendor = %vendor.key, error = %e, "skipping product");
                self.invalid += 1;
            }
        }
    }
}

/// Fetches, filters, and normalizes a tea vendor's live catalog.
///
/// Products from a hinted collection only go through the exclusion list;
/// store-wide products must also look like tea.
///
/// # Errors
///
/// Returns the first fetch error; no partial catalog is returned.
pub async fn fetch_vendor_teas(
    client: &StorefrontClient,
    vendor: &VendorConfig,
    options: &FetchOptions,
) -> Result<FetchedCatalog<NormalizedTea>, ScraperError> {
    let mut catalog = FetchedCatalog::default();

    match vendor.platform {
        Platform::Shopify => {
            let products = fetch_storefront(client, vendor, options, |c| c.tea_type).await?;
            for (product, hint) in products {
                let keep = match hint {
                    Some(_) => !is_excluded(&product.title, product.product_type.as_deref()),
                    None => is_tea_product(
                        &product.title,
                        product.product_type.as_deref(),
                        &product.tags,
                    ),
                };
                if !keep {
                    tracing::debug!(vendor = %vendor.key, title = %product.title, "filtered out");
                    catalog.filtered_out += 1;
                    continue;
                }
                let result = normalize_tea(product, &vendor.name, &vendor.url, hint);
                catalog.push_normalized(vendor, result);
            }
        }
        Platform::Html => {
            let (pages, skipped) = fetch_html_pages(client, vendor, options).await?;
            catalog.invalid += skipped;
            for (page, hint) in pages {
                let excluded = page.name.as_deref().is_some_and(|name| is_excluded(name, None));
                if excluded {
                    tracing::debug!(vendor = %vendor.key, url = %page.url, "filtered out");
                    catalog.filtered_out += 1;
                    continue;
                }
                let result = normalize_html_tea(page, &vendor.name, hint);
                catalog.push_normalized(vendor, result);
            }
        }
    }

    tracing::info!(
        vendor = %vendor.key,
        records = catalog.records.len(),
        filtered_out = catalog.filtered_out,
        invalid = catalog.invalid,
        "tea catalog fetched"
    );
    Ok(catalog)
}

/// Fetches and normalizes a teaware vendor's live catalog.
///
/// Gift cards are the only listings filtered out; everything a teaware
/// vendor sells is treated as teaware.
///
/// # Errors
///
/// Returns the first fetch error; no partial catalog is returned.
/// Static-HTML teaware vendors are not supported and yield
/// [`ScraperError::InvalidStoreUrl`].
pub async fn fetch_vendor_teaware(
    client: &StorefrontClient,
    vendor: &VendorConfig,
    options: &FetchOptions,
) -> Result<FetchedCatalog<NormalizedTeaware>, ScraperError> {
    if vendor.platform != Platform::Shopify {
        return Err(ScraperError::InvalidStoreUrl {
            store_url: vendor.url.clone(),
            reason: format!("teaware vendor '{}' must use the shopify platform", vendor.key),
        });
    }

    let mut catalog = FetchedCatalog::default();
    let slug = vendor.slug();
    let products = fetch_storefront(client, vendor, options, |c| c.category).await?;

    for (product, hint) in products {
        if product.title.to_lowercase().contains("gift card") {
            catalog.filtered_out += 1;
            continue;
        }
        let result = normalize_teaware(product, &vendor.name, &slug, &vendor.url, hint);
        catalog.push_normalized(vendor, result);
    }

    tracing::info!(
        vendor = %vendor.key,
        records = catalog.records.len(),
        filtered_out = catalog.filtered_out,
        invalid = catalog.invalid,
        "teaware catalog fetched"
    );
    Ok(catalog)
}

/// Store-wide products, or each configured collection's products paired with
/// that collection's hint. A product listed in several collections keeps the
/// first collection's hint.
async fn fetch_storefront<H: Copy>(
    client: &StorefrontClient,
    vendor: &VendorConfig,
    options: &FetchOptions,
    hint_of: fn(&CollectionConfig) -> Option<H>,
) -> Result<Vec<(ShopifyProduct, Option<H>)>, ScraperError> {
    if vendor.collections.is_empty() {
        let products = client.fetch_all_products(&vendor.url, None, options).await?;
        return Ok(products.into_iter().map(|p| (p, None)).collect());
    }

    let mut seen: HashSet<i64> = HashSet::new();
    let mut out = Vec::new();
    for collection in &vendor.collections {
        let products = client
            .fetch_all_products(&vendor.url, Some(&collection.handle), options)
            .await?;
        let hint = hint_of(collection);
        out.extend(
            products
                .into_iter()
                .filter(|p| seen.insert(p.id))
                .map(|p| (p, hint)),
        );
    }
    Ok(out)
}

/// Product pages across every configured collection, with the hint of the
/// first collection that listed each URL, and the number of pages skipped.
async fn fetch_html_pages(
    client: &StorefrontClient,
    vendor: &VendorConfig,
    options: &FetchOptions,
) -> Result<(Vec<(HtmlProduct, Option<TeaType>)>, usize), ScraperError> {
    let mut per_collection: Vec<(Vec<String>, Option<TeaType>)> = Vec::new();
    for collection in &vendor.collections {
        let links = client
            .fetch_collection_links(&vendor.url, &collection.handle, options)
            .await?;
        per_collection.push((links, collection.tea_type));
    }

    let urls = merge_product_urls(per_collection.iter().map(|(links, _)| links.iter().cloned()));
    let hint_for = |url: &str| {
        per_collection
            .iter()
            .find(|(links, _)| links.iter().any(|l| l == url))
            .and_then(|(_, hint)| *hint)
    };

    let pages = client.fetch_product_pages(&urls, options).await?;
    let hinted = pages
        .products
        .into_iter()
        .map(|page| {
            let hint = hint_for(&page.url);
            (page, hint)
        })
        .collect();
    Ok((hinted, pages.skipped))
}
