//! Field parsers shared by the storefront and HTML normalizers.
//!
//! Every parser is total: malformed input yields `None` or an empty value,
//! never a panic.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::ShopifyVariant;

/// Character cap for stored tea descriptions.
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Flavor notes kept per tea.
pub const MAX_FLAVOR_NOTES: usize = 5;

const ARTISAN_MAX_CHARS: usize = 60;

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3}(?:,\d{3})+|\d+)(?:\.(\d+))?").expect("valid price regex")
});
static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>").expect("valid regex")
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|\d+);").expect("valid regex"));
static CAPACITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*ml\b").expect("valid capacity regex"));
static ARTISAN_BY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bby\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)").expect("valid artisan regex")
});
static ARTISAN_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[artist(?:\s+name)?\]\s*([^\n\[]+)").expect("valid artisan regex")
});
static ORIGIN_REGION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(Yunnan|Fujian|Sichuan|Anhui|Zhejiang|Guangdong|Hunan|Wuyi|Taiwan|Japan|Uji|Shizuoka|Kagoshima|Nepal|Darjeeling|Assam|Nilgiri|India|Sri Lanka|Ceylon|Kenya|Korea|Vietnam|Laos|Thailand|South Africa|Argentina|Paraguay|Brazil|China)\b",
    )
    .expect("valid origin regex")
});
static ORIGIN_FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfrom\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*(?:,\s*[A-Z][a-z]+)?)")
        .expect("valid origin regex")
});
static SHOPIFY_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_(?:\d+x\d*|x\d+)(@\dx)?(\.[A-Za-z0-9]+)").expect("valid image size regex")
});

/// Words found in descriptions that count as flavor notes.
const FLAVOR_VOCABULARY: &[&str] = &[
    "sweet", "smooth", "malty", "floral", "fruity", "nutty", "earthy", "honey", "chocolate",
    "citrus", "vanilla", "spice", "woody", "mineral", "creamy", "buttery", "grassy", "vegetal",
    "roasted", "smoky", "toasty", "berry", "plum", "grape", "apple", "peach", "apricot",
    "caramel", "orchid", "jasmine", "rose", "violet", "refreshing", "crisp", "bright",
];

/// Tag fragments that mark a tag as merchandising rather than flavor.
const TAG_BLACKLIST: &[&str] = &[
    "tea", "organic", "caffeine", "decaf", "sale", "new", "gift", "best seller", "bestseller",
    "wholesale", "retail", "loose leaf", "sachet", "bag", "kosher", "fair trade", "vegan",
    "gluten", "non-gmo", "limited", "featured", "collection",
];

/// Parses a display price such as `"$12.99"` or `"$1,299.00"`.
///
/// Returns the first number found, ignoring currency symbols and thousands
/// separators. Text without digits (`"Call for pricing"`) yields `None`.
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    let caps = PRICE_RE.captures(text)?;
    let whole = caps.get(1)?.as_str().replace(',', "");
    let value = match caps.get(2) {
        Some(frac) => format!("{whole}.{}", frac.as_str()),
        None => whole,
    };
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Lowest parseable price among a product's variants.
#[must_use]
pub fn lowest_variant_price(variants: &[ShopifyVariant]) -> Option<f64> {
    variants
        .iter()
        .filter_map(|v| parse_price(&v.price))
        .fold(None, |min, p| match min {
            Some(m) if m <= p => Some(m),
            _ => Some(p),
        })
}

/// Strips markup from an HTML fragment, decodes common entities, collapses
/// whitespace, and truncates to `max_chars` characters.
///
/// Returns `None` when nothing but whitespace remains.
#[must_use]
pub fn clean_description(html: &str, max_chars: usize) -> Option<String> {
    let text = html_to_text(html);
    if text.is_empty() {
        return None;
    }
    Some(truncate_chars(&text, max_chars))
}

/// Markup-free, entity-decoded, whitespace-collapsed text of `html`.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let without_code = SCRIPT_STYLE_RE.replace_all(html, " ");
    let without_tags = TAG_RE.replace_all(&without_code, " ");
    let decoded = decode_entities(&without_tags);
    collapse_whitespace(&decoded)
}

/// Decodes the named entities vendors actually emit plus numeric references.
#[must_use]
pub fn decode_entities(s: &str) -> String {
    let named = s
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&rsquo;", "\u{2019}")
        .replace("&lsquo;", "\u{2018}")
        .replace("&rdquo;", "\u{201d}")
        .replace("&ldquo;", "\u{201c}")
        .replace("&ndash;", "\u{2013}")
        .replace("&mdash;", "\u{2014}")
        .replace("&hellip;", "\u{2026}")
        .replace("&deg;", "\u{b0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">");

    let numeric = NUMERIC_ENTITY_RE.replace_all(&named, |caps: &regex::Captures<'_>| {
        let raw = &caps[1];
        let code = match raw.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), |c| c.to_string())
    });

    // Last, so "&amp;lt;" decodes to "&lt;" rather than "<".
    numeric.replace("&amp;", "&")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates to at most `max_chars` characters on a char boundary.
#[must_use]
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].trim_end().to_owned(),
        None => s.to_owned(),
    }
}

/// Capacity in millilitres from text such as `"Gaiwan 120ml"` or `"150 ml"`.
#[must_use]
pub fn parse_capacity_ml(text: &str) -> Option<i32> {
    CAPACITY_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .filter(|ml| *ml > 0)
}

/// Artisan name from `"... by Jin Jia Qi"` or `"[Artist] Jin Jia Qi"`.
///
/// Label captures longer than [`ARTISAN_MAX_CHARS`] ran past the name into
/// body text and are discarded.
#[must_use]
pub fn extract_artisan(text: &str) -> Option<String> {
    if let Some(name) = ARTISAN_BY_RE.captures(text).and_then(|c| c.get(1)) {
        return Some(name.as_str().to_owned());
    }
    ARTISAN_LABEL_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .filter(|s| !s.is_empty() && s.chars().count() <= ARTISAN_MAX_CHARS)
}

/// Growing region named in a description.
///
/// Known tea regions win over a generic `"from <Capitalized Words>"` phrase.
#[must_use]
pub fn extract_origin(text: &str) -> Option<String> {
    if let Some(m) = ORIGIN_REGION_RE.find(text) {
        return Some(m.as_str().to_owned());
    }
    ORIGIN_FROM_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end_matches(',').to_owned())
}

/// Flavor notes for a tea, at most [`MAX_FLAVOR_NOTES`].
///
/// Tags are used when any survive the blacklist (short, no `:` namespaces, no
/// leading `_`, no merchandising words). Otherwise flavor words are picked
/// out of the description.
#[must_use]
pub fn extract_flavor_notes(tags: &[String], description: Option<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let from_tags: Vec<String> = tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| is_flavor_tag(t))
        .filter(|t| seen.insert(t.clone()))
        .take(MAX_FLAVOR_NOTES)
        .collect();
    if !from_tags.is_empty() {
        return from_tags;
    }

    let Some(description) = description else {
        return Vec::new();
    };
    let lower = description.to_lowercase();
    FLAVOR_VOCABULARY
        .iter()
        .filter(|word| lower.contains(*word))
        .take(MAX_FLAVOR_NOTES)
        .map(|word| (*word).to_owned())
        .collect()
}

fn is_flavor_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag.chars().count() < 25
        && !tag.contains(':')
        && !tag.starts_with('_')
        && !TAG_BLACKLIST.iter().any(|b| tag.contains(b))
}

/// Upgrades protocol-relative URLs to https and strips CDN size suffixes
/// (`_410x`, `_200x200`, `_x600`) so the full-size image is stored.
#[must_use]
pub fn clean_image_url(url: &str) -> String {
    let url = url.trim();
    let absolute = match url.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_owned(),
    };
    SHOPIFY_SIZE_RE.replace(&absolute, "$2").into_owned()
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
