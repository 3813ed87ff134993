//! Storefront pagination.
//!
//! Stores that support cursor pagination send a `Link` header whose `next`
//! URL carries a `page_info` query parameter. Older stores ignore
//! `page_info` and paginate by `page=N`; for those the only end-of-catalog
//! signal is a page shorter than the requested `limit`.
//!
//! ## Header format
//!
//! ```text
//! <https://numitea.com/products.json?limit=250&page_info=PREV>; rel="previous",
//! <https://numitea.com/products.json?limit=250&page_info=NEXT>; rel="next"
//! ```

/// Which page to request next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// 1-based page number (`page=N`).
    Number(u32),
    /// Opaque `page_info` cursor from a `Link` header.
    Cursor(String),
}

/// Decides the follow-up request after a page came back.
///
/// A `rel="next"` cursor always wins. Once a run is following cursors, a
/// missing `next` link ends it. Otherwise the page number advances until a
/// page returns fewer than `limit` products.
#[must_use]
pub fn next_page(
    current: &PageRequest,
    link_header: Option<&str>,
    returned: usize,
    limit: u32,
) -> Option<PageRequest> {
    if let Some(cursor) = extract_next_cursor(link_header) {
        return Some(PageRequest::Cursor(cursor));
    }

    match current {
        PageRequest::Cursor(_) => None,
        PageRequest::Number(n) => {
            if returned == 0 || returned < limit as usize {
                None
            } else {
                Some(PageRequest::Number(n + 1))
            }
        }
    }
}

/// The `page_info` cursor of the `rel="next"` link, if any.
///
/// `None` when the header is absent, has no next link, or the next URL
/// carries no cursor.
#[must_use]
pub fn extract_next_cursor(link_header: Option<&str>) -> Option<String> {
    link_header?
        .split(',')
        .map(str::trim)
        .find(|directive| directive.contains(r#"rel="next""#))
        .and_then(link_target)
        .and_then(|url| query_value(url, "page_info"))
}

/// The URL inside `<...>` of one link directive.
fn link_target(directive: &str) -> Option<&str> {
    let (_, rest) = directive.split_once('<')?;
    let (url, _) = rest.split_once('>')?;
    (!url.is_empty()).then_some(url)
}

/// A non-empty query value. Cursors are base64url, so no percent-decoding.
fn query_value(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}
