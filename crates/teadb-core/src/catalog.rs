use serde::{Deserialize, Serialize};

use crate::taxonomy::{ClayType, TeaType, TeawareCategory, TeawareMaterial};

/// Brewing guidance: water temperature in °F and a steep-time range in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteepingParams {
    pub temp_f: i32,
    pub time_min_minutes: i32,
    pub time_max_minutes: i32,
}

/// A vendor tea listing mapped onto the app's vocabulary, ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTea {
    /// Storefront product id when the vendor exposes one.
    pub source_product_id: Option<String>,
    pub name: String,
    pub brand_name: String,
    pub tea_type: TeaType,
    pub description: Option<String>,
    pub origin: Option<String>,
    pub steeping: SteepingParams,
    pub flavor_notes: Vec<String>,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
    pub price_usd: Option<f64>,
}

impl NormalizedTea {
    /// Dedup key for this tea within its company. See [`name_key`].
    #[must_use]
    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }
}

/// A vendor teaware listing mapped onto the app's vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTeaware {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub category: TeawareCategory,
    pub material: TeawareMaterial,
    pub clay_type: Option<ClayType>,
    pub capacity_ml: Option<i32>,
    pub artisan_name: Option<String>,
    pub origin_region: Option<String>,
    pub price_usd: Option<f64>,
    pub product_url: Option<String>,
    pub in_stock: bool,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub recommended_teas: Vec<TeaType>,
}

/// Character cap for generated slugs.
pub const SLUG_MAX_CHARS: usize = 100;

/// Lower-cases, trims, and collapses internal whitespace runs (including
/// non-breaking spaces) to one space.
///
/// This is the only place the key is computed: `upsert_tea` stores it in the
/// `teas.name_key` column that the unique index covers.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Lowercase URL slug for company names and teaware listings.
///
/// Apostrophes vanish (`Churchill's` becomes `churchills`), every other run
/// of non-ASCII-alphanumerics becomes one `-`, and the result has no leading
/// or trailing dash and at most [`SLUG_MAX_CHARS`] characters.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c != '\'' && c != '\u{2019}' {
            pending_dash = true;
        }
    }
    slug.truncate(SLUG_MAX_CHARS);
    slug.trim_end_matches('-').to_owned()
}
