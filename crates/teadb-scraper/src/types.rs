//! Storefront response types for the public `products.json` endpoint, plus the
//! intermediate record produced by HTML product-page extraction.
//!
//! ## Observed shape from tea storefronts
//!
//! ### Tags
//! Returned as a JSON array of strings (`["Black Tea", "Organic", "_hidden"]`),
//! not the comma-separated string of the legacy Liquid API. Stores use tags
//! for tea type, flavor, and internal flags alike, so the normalizer filters
//! them before treating any as flavor notes.
//!
//! ### `product_type`
//! A plain string; frequently empty (`""`), sometimes a tea family
//! (`"Green Tea"`), sometimes a merchandising bucket (`"Assorted"`).
//!
//! ### `price` on variants
//! A decimal string (`"12.99"`). Multi-size teas carry one variant per size;
//! the lowest price is used.
//!
//! ### `available` on variants
//! Absent on some older stores. Defaults to `true`.

use serde::Deserialize;

/// Top-level response from `GET /products.json`.
#[derive(Debug, Deserialize)]
pub struct ShopifyProductsResponse {
    pub products: Vec<ShopifyProduct>,
}

/// A single product from a storefront catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct ShopifyProduct {
    pub id: i64,

    /// Display name, e.g. `"Aged Earl Grey"`.
    pub title: String,

    /// URL slug for the product page, e.g. `"aged-earl-grey"`.
    pub handle: String,

    /// Raw HTML description. May be `null` or absent.
    #[serde(default)]
    pub body_html: Option<String>,

    #[serde(default)]
    pub product_type: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub vendor: Option<String>,

    #[serde(default)]
    pub images: Vec<ShopifyImage>,

    #[serde(default)]
    pub variants: Vec<ShopifyVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopifyVariant {
    pub id: i64,

    #[serde(default)]
    pub title: Option<String>,

    /// Decimal string, e.g. `"30.00"`.
    pub price: String,

    #[serde(default = "default_available")]
    pub available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopifyImage {
    /// CDN URL; may be protocol-relative on older themes.
    pub src: String,
}

/// `serde(default = ...)` needs a function path.
fn default_available() -> bool {
    true
}

/// Fields pulled from a static product detail page.
///
/// Every field except `url` is best-effort; `name` is required by the
/// normalizer and pages without one are rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlProduct {
    pub url: String,
    pub name: Option<String>,
    pub price_usd: Option<f64>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}
