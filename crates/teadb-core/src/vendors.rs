use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::slugify;
use crate::taxonomy::{TeaType, TeawareCategory};
use crate::ConfigError;

/// How a vendor's catalog is retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Paginated `/products.json` storefront API.
    Shopify,
    /// Static collection and product pages.
    Html,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Shopify => write!(f, "shopify"),
            Platform::Html => write!(f, "html"),
        }
    }
}

/// Which table a vendor's products land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Teas,
    Teaware,
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogKind::Teas => write!(f, "teas"),
            CatalogKind::Teaware => write!(f, "teaware"),
        }
    }
}

/// A vendor collection to scrape instead of the whole store.
///
/// The hints override rule-table classification for every product found in
/// the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub handle: String,
    #[serde(default)]
    pub tea_type: Option<TeaType>,
    #[serde(default)]
    pub category: Option<TeawareCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    /// Short CLI identifier, e.g. `bigelow`.
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub url: String,
    pub platform: Platform,
    pub catalog: CatalogKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub founded: Option<i32>,
    #[serde(default)]
    pub specialty: Vec<String>,
    #[serde(default)]
    pub collections: Vec<CollectionConfig>,
}

impl VendorConfig {
    /// The company slug: the configured one, or one derived from the name.
    #[must_use]
    pub fn slug(&self) -> String {
        match &self.slug {
            Some(slug) if !slug.trim().is_empty() => slug.trim().to_owned(),
            _ => slugify(&self.name),
        }
    }

    /// Advisory-lock key and log label for this vendor's import.
    #[must_use]
    pub fn lock_name(&self) -> String {
        format!("teadb:vendor:{}", self.slug())
    }
}

#[derive(Debug, Deserialize)]
pub struct VendorsFile {
    pub vendors: Vec<VendorConfig>,
}

/// Vendors picked for a run, plus any requested keys that matched nothing.
#[derive(Debug)]
pub struct VendorSelection<'a> {
    pub vendors: Vec<&'a VendorConfig>,
    pub unknown: Vec<String>,
}

impl VendorsFile {
    /// Vendors of `catalog`, restricted to `keys` when any are given.
    ///
    /// Requested keys are matched case-insensitively and returned in request
    /// order. Keys naming no vendor of this catalog are reported in
    /// [`VendorSelection::unknown`].
    #[must_use]
    pub fn select(&self, catalog: CatalogKind, keys: &[String]) -> VendorSelection<'_> {
        let of_kind = || self.vendors.iter().filter(move |v| v.catalog == catalog);

        if keys.is_empty() {
            return VendorSelection {
                vendors: of_kind().collect(),
                unknown: Vec::new(),
            };
        }

        let mut vendors = Vec::new();
        let mut unknown = Vec::new();
        for key in keys {
            match of_kind().find(|v| v.key.eq_ignore_ascii_case(key)) {
                Some(vendor) => {
                    if !vendors.iter().any(|v: &&VendorConfig| v.key == vendor.key) {
                        vendors.push(vendor);
                    }
                }
                None => unknown.push(key.clone()),
            }
        }
        VendorSelection { vendors, unknown }
    }
}

/// Load and validate the vendor registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_vendors(path: &Path) -> Result<VendorsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::VendorsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let vendors_file: VendorsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::VendorsFileParse)?;

    validate_vendors(&vendors_file)?;

    Ok(vendors_file)
}

fn validate_vendors(vendors_file: &VendorsFile) -> Result<(), ConfigError> {
    let mut seen_keys = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for vendor in &vendors_file.vendors {
        if vendor.key.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "vendor '{}' has an empty key",
                vendor.name
            )));
        }

        if vendor.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "vendor '{}' has an empty name",
                vendor.key
            )));
        }

        let url = vendor.url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::Validation(format!(
                "vendor '{}' has invalid url '{}'; must start with http:// or https://",
                vendor.key, vendor.url
            )));
        }

        if vendor.platform == Platform::Html && vendor.collections.is_empty() {
            return Err(ConfigError::Validation(format!(
                "html vendor '{}' must list at least one collection",
                vendor.key
            )));
        }

        if vendor.collections.iter().any(|c| c.handle.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "vendor '{}' has a collection with an empty handle",
                vendor.key
            )));
        }

        if !seen_keys.insert(vendor.key.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate vendor key: '{}'",
                vendor.key
            )));
        }

        let slug = vendor.slug();
        if slug.is_empty() {
            return Err(ConfigError::Validation(format!(
                "vendor '{}' produces an empty slug",
                vendor.key
            )));
        }
        if !seen_slugs.insert((vendor.catalog, slug.clone())) {
            return Err(ConfigError::Validation(format!(
                "duplicate {} vendor slug: '{}' (from vendor '{}')",
                vendor.catalog, slug, vendor.key
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "vendors_test.rs"]
mod tests;
