//! Normalization from raw storefront and HTML records to
//! [`teadb_core::NormalizedTea`] and [`teadb_core::NormalizedTeaware`].
//!
//! Field parsing is delegated to [`crate::parse`] and classification to
//! [`crate::rules`]; this module decides which source text feeds which rule.

use std::collections::HashSet;

use teadb_core::{slugify, NormalizedTea, NormalizedTeaware, TeaType, TeawareCategory};

use crate::client::extract_store_origin;
use crate::error::ScraperError;
use crate::parse::{
    clean_description, clean_image_url, extract_artisan, extract_flavor_notes, extract_origin,
    lowest_variant_price, parse_capacity_ml, truncate_chars, DESCRIPTION_MAX_CHARS,
};
use crate::rules::{
    classify_category, classify_clay_type, classify_material, classify_tea_type,
    mentioned_tea_types, recommended_for_vessel,
};
use crate::types::{HtmlProduct, ShopifyProduct};

/// Character cap for teaware short descriptions.
const SHORT_DESCRIPTION_MAX_CHARS: usize = 200;

/// Normalizes a storefront product into a tea record.
///
/// A collection `hint` overrides rule-based tea type classification.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] if the product has a blank title.
pub fn normalize_tea(
    product: ShopifyProduct,
    brand_name: &str,
    store_url: &str,
    hint: Option<TeaType>,
) -> Result<NormalizedTea, ScraperError> {
    let name = required_title(&product)?;

    let product_type = product.product_type.as_deref().unwrap_or_default();
    let tea_type = hint.unwrap_or_else(|| {
        classify_tea_type(&format!("{} {name} {product_type}", product.tags.join(" ")))
    });

    let description = product
        .body_html
        .as_deref()
        .and_then(|html| clean_description(html, DESCRIPTION_MAX_CHARS));
    let origin = description.as_deref().and_then(extract_origin);
    let flavor_notes = extract_flavor_notes(&product.tags, description.as_deref());

    Ok(NormalizedTea {
        source_product_id: Some(product.id.to_string()),
        product_url: Some(product_url(store_url, &product.handle)),
        image_url: product.images.first().map(|img| clean_image_url(&img.src)),
        price_usd: lowest_variant_price(&product.variants),
        name,
        brand_name: brand_name.to_owned(),
        tea_type,
        description,
        origin,
        steeping: tea_type.default_steeping(),
        flavor_notes,
    })
}

/// Normalizes a scraped product page into a tea record.
///
/// Pages carry no tags or product type, so the type comes from the
/// collection `hint` or, failing that, from the product name.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] if no product name was found.
pub fn normalize_html_tea(
    page: HtmlProduct,
    brand_name: &str,
    hint: Option<TeaType>,
) -> Result<NormalizedTea, ScraperError> {
    let name = page
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| ScraperError::Normalization {
            product: page.url.clone(),
            reason: "product page has no name".into(),
        })?;

    let tea_type = hint.unwrap_or_else(|| classify_tea_type(&name));
    let origin = page.description.as_deref().and_then(extract_origin);
    let flavor_notes = extract_flavor_notes(&[], page.description.as_deref());

    Ok(NormalizedTea {
        source_product_id: None,
        name,
        brand_name: brand_name.to_owned(),
        tea_type,
        description: page.description,
        origin,
        steeping: tea_type.default_steeping(),
        flavor_notes,
        image_url: page.image_url,
        product_url: Some(page.url),
        price_usd: page.price_usd,
    })
}

/// Normalizes a storefront product into a teaware record.
///
/// Slugs are prefixed with the vendor slug so identical product names from
/// different shops stay distinct. A collection `hint` overrides the category
/// rules. The product's `vendor` field stands in for the artisan when the
/// listing names none and it differs from the shop's own name.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] if the title is blank or yields an
/// empty slug.
pub fn normalize_teaware(
    product: ShopifyProduct,
    company_name: &str,
    vendor_slug: &str,
    store_url: &str,
    hint: Option<TeawareCategory>,
) -> Result<NormalizedTeaware, ScraperError> {
    let name = required_title(&product)?;
    let slug = slugify(&format!("{vendor_slug} {name}"));
    if slug.is_empty() {
        return Err(ScraperError::Normalization {
            product: product.id.to_string(),
            reason: "title produces an empty slug".into(),
        });
    }

    let product_type = product.product_type.as_deref().unwrap_or_default();
    let tags = product.tags.join(" ");
    let description = product
        .body_html
        .as_deref()
        .and_then(|html| clean_description(html, DESCRIPTION_MAX_CHARS));
    let body = description.as_deref().unwrap_or_default();
    let listing_text = format!("{name} {product_type} {tags}");
    let full_text = format!("{listing_text} {body}");

    let category = hint.unwrap_or_else(|| classify_category(&listing_text));
    let material = classify_material(&full_text);
    let clay_type = classify_clay_type(&full_text);

    let capacity_ml = parse_capacity_ml(&name)
        .or_else(|| {
            product
                .variants
                .iter()
                .filter_map(|v| v.title.as_deref())
                .find_map(parse_capacity_ml)
        })
        .or_else(|| parse_capacity_ml(body));

    let artisan_name = extract_artisan(&format!("{name}\n{body}")).or_else(|| {
        product
            .vendor
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(company_name))
            .map(str::to_owned)
    });

    let mut recommended_teas = mentioned_tea_types(&full_text);
    if recommended_teas.is_empty() {
        recommended_teas = recommended_for_vessel(material, clay_type);
    }

    let mut seen = HashSet::new();
    let images: Vec<String> = product
        .images
        .iter()
        .map(|img| clean_image_url(&img.src))
        .filter(|url| seen.insert(url.clone()))
        .collect();

    Ok(NormalizedTeaware {
        short_description: description
            .as_deref()
            .map(|d| truncate_chars(d, SHORT_DESCRIPTION_MAX_CHARS)),
        origin_region: extract_origin(&full_text),
        price_usd: lowest_variant_price(&product.variants),
        product_url: Some(product_url(store_url, &product.handle)),
        in_stock: product.variants.iter().any(|v| v.available),
        image_url: images.first().cloned(),
        name,
        slug,
        description,
        category,
        material,
        clay_type,
        capacity_ml,
        artisan_name,
        images,
        recommended_teas,
    })
}

fn required_title(product: &ShopifyProduct) -> Result<String, ScraperError> {
    let title = product.title.trim();
    if title.is_empty() {
        return Err(ScraperError::Normalization {
            product: product.id.to_string(),
            reason: "product has a blank title".into(),
        });
    }
    Ok(title.to_owned())
}

fn product_url(store_url: &str, handle: &str) -> String {
    format!("{}/products/{handle}", extract_store_origin(store_url))
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
