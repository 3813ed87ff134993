//! Regex-based extraction from static collection and product pages.
//!
//! Pages are scanned tag by tag rather than parsed into a DOM. Selectors are
//! ordered fallback chains; the first one yielding a usable value wins.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::parse::{
    clean_description, clean_image_url, decode_entities, html_to_text, parse_price,
    DESCRIPTION_MAX_CHARS,
};
use crate::types::HtmlProduct;

static OPEN_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<([a-z][a-z0-9]*)\b[^>]*>").expect("valid regex"));
static ANY_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(/?)([a-z][a-z0-9]*)\b[^>]*?(/?)>").expect("valid regex"));
static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid regex"));
pub(crate) static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("valid regex"));
static ANCHOR_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*>").expect("valid regex"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid attr regex")
});

const NAME_CLASSES: &[&str] = &["product_name", "product__title", "product-title"];
const CURRENT_PRICE_CLASSES: &[&str] = &[
    "price__current",
    "price--current",
    "current-price",
    "product_price",
    "product-price",
];
const GALLERY_CLASSES: &[&str] = &["product_gallery", "product-gallery", "product__media"];
const DESCRIPTION_CLASSES: &[&str] = &[
    "product-description",
    "product__description",
    "product_description",
    "description",
    "rte",
];

// -----------------------------------------------------------------------
// Collection pages
// -----------------------------------------------------------------------

/// Product page links on a collection page, canonicalized to
/// `{origin}/products/{handle}` and deduplicated in page order.
///
/// Links to other hosts, and JSON/JS variants of product URLs, are dropped.
#[must_use]
pub fn extract_product_links(html: &str, page_url: &str) -> Vec<String> {
    let Ok(base) = reqwest::Url::parse(page_url) else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for m in ANCHOR_TAG_RE.find_iter(html) {
        let Some(href) = attr(m.as_str(), "href") else {
            continue;
        };
        if !href.contains("/products/") {
            continue;
        }
        let Ok(url) = base.join(&href) else {
            continue;
        };
        if url.host_str() != base.host_str() {
            continue;
        }
        let Some(handle) = product_handle(url.path()) else {
            continue;
        };
        let canonical = format!("{}/products/{handle}", url.origin().ascii_serialization());
        if seen.insert(canonical.clone()) {
            links.push(canonical);
        }
    }
    links
}

fn product_handle(path: &str) -> Option<&str> {
    let (_, rest) = path.split_once("/products/")?;
    let handle = rest.split('/').next()?;
    let is_asset = [".json", ".js", ".oembed"]
        .iter()
        .any(|ext| handle.ends_with(ext));
    (!handle.is_empty() && !is_asset).then_some(handle)
}

/// Merges product URL lists from several collection pages into one list with
/// no repeats, keeping first-seen order.
#[must_use]
pub fn merge_product_urls<I, L>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    lists
        .into_iter()
        .flatten()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

// -----------------------------------------------------------------------
// Product detail pages
// -----------------------------------------------------------------------

/// Best-effort fields of a product detail page.
#[must_use]
pub fn extract_product_detail(html: &str, url: &str) -> HtmlProduct {
    HtmlProduct {
        url: url.to_owned(),
        name: extract_name(html),
        price_usd: extract_price(html),
        image_url: extract_image(html, url),
        description: extract_description(html),
    }
}

/// `h1.product_name` → any `h1` → `og:title`.
fn extract_name(html: &str) -> Option<String> {
    let headings: Vec<(String, String)> = open_tags(html)
        .filter(|(name, _)| name == "h1")
        .map(|(_, caps)| {
            let tag = caps.get(0).map_or("", |m| m.as_str());
            (class_of(tag), html_to_text(element_inner(html, &caps, "h1")))
        })
        .filter(|(_, text)| !text.is_empty())
        .collect();

    headings
        .iter()
        .find(|(class, _)| NAME_CLASSES.iter().any(|c| class.contains(c)))
        .or_else(|| headings.first())
        .map(|(_, text)| text.clone())
        .or_else(|| find_meta_content(html, "property", "og:title"))
}

/// Current-price element → any price-classed element → `og:price:amount`.
fn extract_price(html: &str) -> Option<f64> {
    let priced: Vec<(String, Option<f64>)> = open_tags(html)
        .filter_map(|(name, caps)| {
            let tag = caps.get(0)?.as_str();
            let class = class_of(tag);
            if !class.contains("price") || class.contains("compare") {
                return None;
            }
            let text = html_to_text(element_inner(html, &caps, &name));
            Some((class, parse_price(&text)))
        })
        .collect();

    let current = priced
        .iter()
        .filter(|(class, _)| CURRENT_PRICE_CLASSES.iter().any(|c| class.contains(c)))
        .find_map(|(_, price)| *price);

    current
        .or_else(|| priced.iter().find_map(|(_, price)| *price))
        .or_else(|| meta_price(html, "og:price:amount"))
        .or_else(|| meta_price(html, "product:price:amount"))
}

fn meta_price(html: &str, property: &str) -> Option<f64> {
    find_meta_content(html, "property", property).and_then(|v| parse_price(&v))
}

/// `og:image` → product gallery `img` → first CDN product image.
fn extract_image(html: &str, page_url: &str) -> Option<String> {
    let raw = find_meta_content(html, "property", "og:image")
        .or_else(|| gallery_image(html))
        .or_else(|| first_product_image(html))?;
    absolutize_url(page_url, &clean_image_url(&raw))
}

fn gallery_image(html: &str) -> Option<String> {
    open_tags(html).find_map(|(name, caps)| {
        let tag = caps.get(0)?.as_str();
        let class = class_of(tag);
        if !GALLERY_CLASSES.iter().any(|c| class.contains(c)) {
            return None;
        }
        let inner = element_inner(html, &caps, &name);
        IMG_TAG_RE.find_iter(inner).find_map(|m| img_src(m.as_str()))
    })
}

fn first_product_image(html: &str) -> Option<String> {
    IMG_TAG_RE.find_iter(html).find_map(|m| {
        let src = img_src(m.as_str())?;
        let lower = src.to_ascii_lowercase();
        let is_product = lower.contains("cdn.shopify") || lower.contains("/products/");
        let is_chrome = ["logo", "icon", "header"].iter().any(|w| lower.contains(w));
        (is_product && !is_chrome).then_some(src)
    })
}

pub(crate) fn img_src(tag: &str) -> Option<String> {
    attr(tag, "src")
        .or_else(|| attr(tag, "data-src"))
        .filter(|s| !s.starts_with("data:"))
}

/// Meta description → description-classed block.
fn extract_description(html: &str) -> Option<String> {
    if let Some(meta) = find_meta_content(html, "name", "description")
        .and_then(|content| clean_description(&content, DESCRIPTION_MAX_CHARS))
    {
        return Some(meta);
    }

    open_tags(html).find_map(|(name, caps)| {
        let tag = caps.get(0)?.as_str();
        let class = class_of(tag);
        if !DESCRIPTION_CLASSES.iter().any(|c| class.contains(c)) {
            return None;
        }
        clean_description(element_inner(html, &caps, &name), DESCRIPTION_MAX_CHARS)
    })
}

// -----------------------------------------------------------------------
// Tag helpers
// -----------------------------------------------------------------------

/// Opening tags in document order with their lowercased names.
fn open_tags(html: &str) -> impl Iterator<Item = (String, Captures<'_>)> + '_ {
    OPEN_TAG_RE.captures_iter(html).filter_map(|caps| {
        let name = caps.get(1)?.as_str().to_ascii_lowercase();
        Some((name, caps))
    })
}

/// Inner HTML of the element opened by `open`, matching nested tags of the
/// same name. An unclosed element runs to the end of the document.
fn element_inner<'a>(html: &'a str, open: &Captures<'_>, name: &str) -> &'a str {
    let Some(whole) = open.get(0) else {
        return "";
    };
    let start = whole.end();
    if whole.as_str().ends_with("/>") {
        return "";
    }

    let mut depth = 1usize;
    for caps in ANY_TAG_RE.captures_iter(&html[start..]) {
        let Some(tag_name) = caps.get(2) else {
            continue;
        };
        if !tag_name.as_str().eq_ignore_ascii_case(name) {
            continue;
        }
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let self_closing = caps.get(3).is_some_and(|m| !m.as_str().is_empty());
        if closing {
            depth -= 1;
            if depth == 0 {
                let end = start + caps.get(0).map_or(0, |m| m.start());
                return &html[start..end];
            }
        } else if !self_closing {
            depth += 1;
        }
    }
    &html[start..]
}

/// Value of attribute `name` in an opening tag, entity-decoded and trimmed.
pub(crate) fn attr(tag: &str, name: &str) -> Option<String> {
    ATTR_RE.captures_iter(tag).find_map(|caps| {
        let key = caps.get(1)?.as_str();
        if !key.eq_ignore_ascii_case(name) {
            return None;
        }
        let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4))?;
        let value = decode_entities(value.as_str()).trim().to_owned();
        (!value.is_empty()).then_some(value)
    })
}

fn class_of(tag: &str) -> String {
    attr(tag, "class").unwrap_or_default().to_ascii_lowercase()
}

pub(crate) fn find_meta_content(
    html: &str,
    key_attr: &str,
    key_value: &str,
) -> Option<String> {
    META_TAG_RE.find_iter(html).find_map(|m| {
        let tag = m.as_str();
        let key = attr(tag, key_attr)?;
        if key.eq_ignore_ascii_case(key_value) {
            attr(tag, "content")
        } else {
            None
        }
    })
}

pub(crate) fn absolutize_url(base_url: &str, candidate: &str) -> Option<String> {
    let base = reqwest::Url::parse(base_url).ok()?;
    base.join(candidate).ok().map(|u| u.to_string())
}

#[cfg(test)]
#[path = "html_test.rs"]
mod tests;
