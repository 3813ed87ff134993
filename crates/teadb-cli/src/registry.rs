//! Vendor registry loading and selection for a run.

use anyhow::Context;
use teadb_core::{load_vendors, AppConfig, CatalogKind, VendorConfig, VendorsFile};

/// Loads `TEADB_VENDORS_PATH`.
pub(crate) fn load_registry(config: &AppConfig) -> anyhow::Result<VendorsFile> {
    load_vendors(&config.vendors_path).with_context(|| {
        format!(
            "failed to load vendor registry from {}",
            config.vendors_path.display()
        )
    })
}

/// Vendors of `catalog` named by `keys` (all of them when empty).
///
/// Unknown keys are reported and skipped.
pub(crate) fn select_vendors<'a>(
    registry: &'a VendorsFile,
    catalog: CatalogKind,
    keys: &[String],
) -> Vec<&'a VendorConfig> {
    let selection = registry.select(catalog, keys);
    for key in &selection.unknown {
        tracing::warn!(vendor = %key, %catalog, "unknown vendor key, skipping");
        println!("unknown {catalog} vendor '{key}', skipping");
    }
    selection.vendors
}
