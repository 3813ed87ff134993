//! URL origin and domain helpers for vendor storefront URLs.

/// Extracts the scheme+host origin from a vendor URL.
///
/// Given `"https://numitea.com/collections/all"`, returns `"https://numitea.com"`.
/// Catalog endpoints are always addressed from the store root, whatever path
/// the vendor registry entry carries.
#[must_use]
pub fn extract_store_origin(store_url: &str) -> String {
    reqwest::Url::parse(store_url).map_or_else(
        |e| {
            tracing::warn!(
                store_url,
                error = %e,
                "could not parse vendor url; falling back to string split, check config/vendors.yaml"
            );
            store_url
                .trim_end_matches('/')
                .splitn(4, '/')
                .take(3)
                .collect::<Vec<_>>()
                .join("/")
        },
        |u| u.origin().ascii_serialization(),
    )
}

/// HTML collection page URL: `{origin}/collections/{handle}?page={page}`.
#[must_use]
pub fn collection_url(store_url: &str, handle: &str, page: u32) -> String {
    format!(
        "{}/collections/{}?page={page}",
        extract_store_origin(store_url),
        handle.trim().trim_matches('/')
    )
}

/// Hostname of a URL, for error messages. Falls back to the input.
pub(super) fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
