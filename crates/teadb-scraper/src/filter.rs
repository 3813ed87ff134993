//! Keeps tea listings and drops gift cards, merchandise, and teaware that
//! share a storefront with them.

use std::sync::LazyLock;

use regex::Regex;

/// Substrings (lowercase) that mark a listing as not a single tea.
const EXCLUDED_PATTERNS: &[&str] = &[
    "gift card",
    "e-gift",
    "subscription",
    "membership",
    "merch",
    "t-shirt",
    "tote",
    "candle",
    "gift",
    "sampler",
    "variety pack",
    "assortment",
    "discovery box",
    "mug",
    "cup",
    "teapot",
    "infuser",
    "accessory",
    "accessories",
    "teaware",
    "honey",
    "sweetener",
    "cookie",
    "biscuit",
    "lozenge",
    "capsule",
    "supplement",
    "carbon offset",
    "carbon neutral",
    "latte powder",
    "drinking chocolate",
    "bundle",
    "combo",
    "set of",
];

/// Words that mark a title or tag as tea.
const TEA_KEYWORDS: &[&str] = &["tea", "chai", "matcha", "tisane", "herbal", "infusion"];

static TEA_PRODUCT_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(black|green|white|herbal|oolong|pu-?erh|rooibos)\s*teas?$|^assorted$")
        .expect("valid product type regex")
});

/// `true` if the title or product type names a non-tea item.
#[must_use]
pub fn is_excluded(title: &str, product_type: Option<&str>) -> bool {
    let haystack = format!("{} {}", title, product_type.unwrap_or_default()).to_lowercase();
    EXCLUDED_PATTERNS.iter().any(|p| haystack.contains(p))
}

/// Whether a storefront listing is a tea.
///
/// Exclusions always win. Otherwise a product is accepted when its product
/// type names a tea family, or its title or tags contain a tea keyword.
#[must_use]
pub fn is_tea_product(title: &str, product_type: Option<&str>, tags: &[String]) -> bool {
    if is_excluded(title, product_type) {
        return false;
    }

    if product_type.is_some_and(|t| TEA_PRODUCT_TYPE_RE.is_match(t.trim())) {
        return true;
    }

    let title = title.to_lowercase();
    TEA_KEYWORDS.iter().any(|k| title.contains(k))
        || tags.iter().any(|tag| {
            let tag = tag.to_lowercase();
            TEA_KEYWORDS.iter().any(|k| tag.contains(k))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn gift_card_rejected() {
        assert!(!is_tea_product("Gift Card \u{2014} $25", None, &[]));
    }

    #[test]
    fn merchandise_rejected_even_with_tea_keyword() {
        assert!(!is_tea_product("Tea Lover Mug", None, &tags(&["tea"])));
        assert!(!is_tea_product("Green Tea Sampler", Some("Green Tea"), &[]));
        assert!(!is_tea_product("Wildflower Honey", None, &tags(&["tea"])));
        assert!(!is_tea_product("Set of 3 Tins", Some("Black Tea"), &[]));
    }

    #[test]
    fn exclusion_checks_product_type() {
        assert!(!is_tea_product("Kyoto", Some("Teaware"), &[]));
    }

    #[test]
    fn tea_product_type_accepted() {
        assert!(is_tea_product("Assam Mokalbari", Some("Black Tea"), &[]));
        assert!(is_tea_product("Daily Dozen", Some("assorted"), &[]));
    }

    #[test]
    fn tea_keyword_in_title_or_tags_accepted() {
        assert!(is_tea_product("Organic Masala Chai", None, &[]));
        assert!(is_tea_product("Breakfast Blend", Some(""), &tags(&["Black Tea"])));
    }

    #[test]
    fn non_tea_without_keywords_rejected() {
        assert!(!is_tea_product("Bamboo Whisk", Some("Tools"), &tags(&["new-arrivals"])));
        assert!(!is_tea_product("Coffee Beans", None, &[]));
    }
}
