//! Company logo discovery from a vendor's homepage.

use std::sync::LazyLock;

use regex::Regex;

use crate::client::{extract_store_origin, StorefrontClient};
use crate::error::ScraperError;
use crate::html::{absolutize_url, attr, find_meta_content, img_src, IMG_TAG_RE};
use crate::parse::clean_image_url;

static LINK_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<link\b[^>]*>").expect("valid regex"));
static SIZES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*x\s*(\d+)").expect("valid sizes regex"));

/// Where a logo URL was found, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoSource {
    OgImage,
    LogoImg,
    LinkIcon,
    Favicon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyLogo {
    pub url: String,
    pub source: LogoSource,
}

/// Finds a logo for the company whose website is `website_url`.
///
/// The homepage is searched for `og:image`, then an `<img>` marked as a logo,
/// then a `<link rel="…icon">`. With none of those, `/favicon.ico` is used if
/// the server answers it with a 2xx.
///
/// # Errors
///
/// Returns the [`StorefrontClient::fetch_html`] error if the homepage cannot
/// be fetched.
pub async fn fetch_company_logo(
    client: &StorefrontClient,
    website_url: &str,
) -> Result<Option<CompanyLogo>, ScraperError> {
    let origin = extract_store_origin(website_url);
    let html = client.fetch_html(&origin).await?;
    if let Some(logo) = extract_logo(&origin, &html) {
        return Ok(Some(logo));
    }

    let favicon = format!("{origin}/favicon.ico");
    match client.send(&favicon, "image/*").await {
        Ok(_) => Ok(Some(CompanyLogo {
            url: favicon,
            source: LogoSource::Favicon,
        })),
        Err(e) => {
            tracing::debug!(website_url, error = %e, "no favicon.ico");
            Ok(None)
        }
    }
}

/// Best logo candidate on a homepage, resolved against `base_url`.
#[must_use]
pub fn extract_logo(base_url: &str, html: &str) -> Option<CompanyLogo> {
    let found = |source: LogoSource| {
        move |raw: String| {
            absolutize_url(base_url, &clean_image_url(&raw)).map(|url| CompanyLogo { url, source })
        }
    };

    find_meta_content(html, "property", "og:image")
        .and_then(found(LogoSource::OgImage))
        .or_else(|| logo_img(html).and_then(found(LogoSource::LogoImg)))
        .or_else(|| best_icon(html).and_then(found(LogoSource::LinkIcon)))
}

/// First `<img>` whose class, id, alt, or src mentions "logo".
fn logo_img(html: &str) -> Option<String> {
    IMG_TAG_RE.find_iter(html).find_map(|m| {
        let tag = m.as_str();
        let src = img_src(tag)?;
        let marked = ["class", "id", "alt"]
            .into_iter()
            .filter_map(|name| attr(tag, name))
            .chain(std::iter::once(src.clone()))
            .any(|v| v.to_ascii_lowercase().contains("logo"));
        marked.then_some(src)
    })
}

/// The largest declared `rel="…icon"` link; `apple-touch-icon` wins ties.
fn best_icon(html: &str) -> Option<String> {
    LINK_TAG_RE
        .find_iter(html)
        .filter_map(|m| {
            let tag = m.as_str();
            let rel = attr(tag, "rel")?.to_ascii_lowercase();
            if !rel.contains("icon") {
                return None;
            }
            let href = attr(tag, "href")?;
            let size = attr(tag, "sizes").as_deref().map_or(0, icon_size);
            Some(((size, rel.contains("apple-touch-icon")), href))
        })
        .max_by_key(|(rank, _)| *rank)
        .map(|(_, href)| href)
}

/// Smaller side of a `sizes="180x180"` value; 0 when absent or unparseable.
fn icon_size(sizes: &str) -> u32 {
    SIZES_RE
        .captures(sizes)
        .and_then(|c| {
            let w = c.get(1)?.as_str().parse::<u32>().ok()?;
            let h = c.get(2)?.as_str().parse::<u32>().ok()?;
            Some(w.min(h))
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn og_image_comes_first() {
        let html = r#"
            <meta property="og:image" content="//cdn.shopify.com/s/files/1/share.png?v=3">
            <img class="header__logo" src="/assets/logo.svg">
        "#;
        let logo = extract_logo("https://numitea.com", html).unwrap();
        assert_eq!(logo.source, LogoSource::OgImage);
        assert_eq!(logo.url, "https://cdn.shopify.com/s/files/1/share.png?v=3");
    }

    #[test]
    fn logo_img_is_found_by_class_alt_or_src() {
        for tag in [
            r#"<img class="site-logo" src="/a.png">"#,
            r#"<img alt="Harney Logo" src="/a.png">"#,
            r#"<img src="/images/brand-logo.png">"#,
        ] {
            let html = format!(r#"<img src="/hero.jpg">{tag}"#);
            let logo = extract_logo("https://harney.com/pages/about", &html).unwrap();
            assert_eq!(logo.source, LogoSource::LogoImg, "{tag}");
            assert!(logo.url.starts_with("https://harney.com/"), "{}", logo.url);
        }
    }

    #[test]
    fn largest_icon_wins() {
        let html = r#"
            <link rel="icon" href="/favicon-32.png" sizes="32x32">
            <link rel="apple-touch-icon" href="/touch.png" sizes="180x180">
            <link rel="stylesheet" href="/big.css">
        "#;
        let logo = extract_logo("https://stash.com", html).unwrap();
        assert_eq!(logo.source, LogoSource::LinkIcon);
        assert_eq!(logo.url, "https://stash.com/touch.png");
    }

    #[test]
    fn page_without_candidates_yields_none() {
        assert!(extract_logo("https://x.example.com", "<p>hello</p>").is_none());
    }

    #[test]
    fn icon_size_reads_the_smaller_side() {
        assert_eq!(icon_size("192x180"), 180);
        assert_eq!(icon_size("any"), 0);
    }
}
