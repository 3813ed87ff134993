//! Integration tests for `StorefrontClient` and the vendor-level catalog
//! fetch.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no real
//! network traffic is made.

use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use teadb_core::{
    CatalogKind, CollectionConfig, Platform, RetryPolicy, TeaType, TeawareCategory, VendorConfig,
};
use teadb_scraper::{
    fetch_company_logo, fetch_vendor_teas, fetch_vendor_teaware, FetchOptions, LogoSource,
    ScraperError, StorefrontClient,
};

/// 5-second timeout, descriptive UA, no retries.
fn test_client() -> StorefrontClient {
    test_client_with_retries(0)
}

/// Retries enabled with zero back-off so tests never sleep.
fn test_client_with_retries(max_retries: u32) -> StorefrontClient {
    let retry = RetryPolicy {
        max_retries,
        backoff_base_ms: 0,
    };
    StorefrontClient::new(5, "teadb-test/0.1", retry).expect("failed to build test client")
}

fn options(limit: u32) -> FetchOptions {
    FetchOptions {
        limit,
        inter_request_delay_ms: 0,
        max_pages: 50,
    }
}

fn product_json(id: i64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "handle": format!("product-{id}"),
        "body_html": "<p>A smooth cup.</p>",
        "product_type": "",
        "tags": [],
        "vendor": null,
        "images": [],
        "variants": [{ "id": id * 10, "title": "Default Title", "price": "12.99", "available": true }]
    })
}

fn page_json(products: &[(i64, &str)]) -> serde_json::Value {
    let products: Vec<_> = products.iter().map(|(id, t)| product_json(*id, t)).collect();
    json!({ "products": products })
}

fn vendor(key: &str, url: &str, platform: Platform, catalog: CatalogKind) -> VendorConfig {
    VendorConfig {
        key: key.to_owned(),
        name: format!("{key} Tea Co"),
        slug: None,
        url: url.to_owned(),
        platform,
        catalog,
        description: None,
        city: None,
        state: None,
        country: None,
        founded: None,
        specialty: vec![],
        collections: vec![],
    }
}

/// Collection page body linking to each product handle.
fn listing(handles: &[&str]) -> String {
    handles
        .iter()
        .map(|h| format!(r#"<a href="/collections/x/products/{h}">{h}</a>"#))
        .collect()
}

// ---------------------------------------------------------------------------
// fetch_all_products: pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_catalog_returns_empty_vec() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
        .expect(1)
        .mount(&server)
        .await;

    let products = test_client()
        .fetch_all_products(&server.uri(), None, &options(250))
        .await
        .unwrap();
    assert!(products.is_empty());
}

#[tokio::test]
async fn page_numbers_advance_until_short_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_json(&[(1, "A Tea"), (2, "B Tea")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(3, "C Tea")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(4, "D Tea")])))
        .expect(0)
        .mount(&server)
        .await;

    let products = test_client()
        .fetch_all_products(&server.uri(), None, &options(2))
        .await
        .unwrap();
    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn follows_link_cursor_until_no_next() {
    let server = MockServer::start().await;
    let next_link = format!(
        "<{base}/products.json?limit=1&page_info=cursor2>; rel=\"next\"",
        base = server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param_is_missing("page_info"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_json(&[(1, "A Tea")]))
                .insert_header("Link", next_link.as_str()),
        )
        .mount(&server)
        .await;
    // Full page but no rel="next": a cursor walk ends here.
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page_info", "cursor2"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(2, "B Tea")])))
        .expect(1)
        .mount(&server)
        .await;

    let products = test_client()
        .fetch_all_products(&server.uri(), None, &options(1))
        .await
        .unwrap();
    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn collection_scoped_fetch_uses_collection_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/green-tea/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(9, "Sencha")])))
        .expect(1)
        .mount(&server)
        .await;

    let products = test_client()
        .fetch_all_products(&server.uri(), Some("green-tea"), &options(250))
        .await
        .unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].title, "Sencha");
}

#[tokio::test]
async fn store_ignoring_page_param_stops_on_repeat() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_json(&[(1, "A Tea"), (2, "B Tea")])),
        )
        .expect(2)
        .mount(&server)
        .await;

    let products = test_client()
        .fetch_all_products(&server.uri(), None, &options(2))
        .await
        .unwrap();
    assert_eq!(products.len(), 2);
}

#[tokio::test]
async fn endless_cursor_hits_pagination_limit() {
    let server = MockServer::start().await;
    let link = format!(
        "<{base}/products.json?limit=1&page_info=again>; rel=\"next\"",
        base = server.uri()
    );
    let mut next_id = 0;
    for _ in 0..3 {
        next_id += 1;
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(page_json(&[(next_id, "Loop Tea")]))
                    .insert_header("Link", link.as_str()),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
    }

    let opts = FetchOptions {
        max_pages: 2,
        ..options(1)
    };
    let err = test_client()
        .fetch_all_products(&server.uri(), None, &opts)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::PaginationLimit { max_pages: 2, .. }),
        "expected PaginationLimit, got: {err:?}"
    );
}

// ---------------------------------------------------------------------------
// fetch_all_products: errors and retries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rate_limit_propagates_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_all_products(&server.uri(), None, &options(250))
        .await
        .unwrap_err();
    match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => assert_eq!(retry_after_secs, 30),
        other => panic!("expected RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_without_retry_after_defaults_to_60s() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_all_products(&server.uri(), None, &options(250))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ScraperError::RateLimited {
            retry_after_secs: 60,
            ..
        }
    ));
}

#[tokio::test]
async fn not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client_with_retries(3)
        .fetch_all_products(&server.uri(), None, &options(250))
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::NotFound { .. }), "got: {err:?}");
}

#[tokio::test]
async fn malformed_json_is_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client_with_retries(2)
        .fetch_all_products(&server.uri(), None, &options(250))
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::Deserialize { .. }), "got: {err:?}");
}

#[tokio::test]
async fn second_page_failure_discards_first_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(1, "A Tea")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_all_products(&server.uri(), None, &options(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ScraperError::UnexpectedStatus { status: 500, .. }
    ));
}

#[tokio::test]
async fn retries_after_503_and_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(77, "Keemun")])))
        .mount(&server)
        .await;

    let products = test_client_with_retries(1)
        .fetch_all_products(&server.uri(), None, &options(250))
        .await
        .unwrap();
    assert_eq!(products[0].id, 77);
}

#[tokio::test]
async fn gives_up_after_exhausting_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(3) // 1 initial + 2 retries
        .mount(&server)
        .await;

    let err = test_client_with_retries(2)
        .fetch_all_products(&server.uri(), None, &options(250))
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::RateLimited { .. }));
}

#[tokio::test]
async fn waits_at_least_retry_after_before_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(5, "Dian Hong")])))
        .mount(&server)
        .await;

    let started = std::time::Instant::now();
    let products = test_client_with_retries(1)
        .fetch_all_products(&server.uri(), None, &options(250))
        .await
        .unwrap();
    assert_eq!(products[0].id, 5);
    assert!(
        started.elapsed() >= std::time::Duration::from_secs(1),
        "zero back-off must still honour Retry-After"
    );
}

// ---------------------------------------------------------------------------
// Vendor-level catalog fetch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shopify_tea_vendor_filters_and_normalizes() {
    let server = MockServer::start().await;
    let body = json!({
        "products": [
            {
                "id": 1, "title": "Gift Card \u{2014} $25", "handle": "gift-card",
                "product_type": "Gift Card", "tags": [], "variants": [{"id": 10, "price": "25.00"}]
            },
            {
                "id": 2, "title": "Assam Breakfast", "handle": "assam-breakfast",
                "product_type": "Black Tea", "tags": ["Malty"], "variants": [{"id": 20, "price": "9.00"}]
            },
            {
                "id": 3, "title": "Stainless Strainer", "handle": "strainer",
                "product_type": "Tools", "tags": [], "variants": [{"id": 30, "price": "5.00"}]
            },
            {
                "id": 4, "title": " ", "handle": "blank",
                "product_type": "Green Tea", "tags": [], "variants": []
            }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let v = vendor("numi", &server.uri(), Platform::Shopify, CatalogKind::Teas);
    let catalog = fetch_vendor_teas(&test_client(), &v, &options(250))
        .await
        .unwrap();

    assert_eq!(catalog.records.len(), 1);
    assert_eq!(catalog.filtered_out, 2);
    assert_eq!(catalog.invalid, 1);
    let tea = &catalog.records[0];
    assert_eq!(tea.name, "Assam Breakfast");
    assert_eq!(tea.brand_name, "numi Tea Co");
    assert_eq!(tea.tea_type, TeaType::Black);
    assert_eq!(tea.flavor_notes, vec!["malty"]);
}

#[tokio::test]
async fn collection_hint_sets_tea_type_and_first_collection_wins() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/oolong-tea/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[(1, "Iron Goddess")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/all-teas/products.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_json(&[(1, "Iron Goddess"), (2, "Golden Yunnan")])),
        )
        .mount(&server)
        .await;

    let mut v = vendor("rishi", &server.uri(), Platform::Shopify, CatalogKind::Teas);
    v.collections = vec![
        CollectionConfig {
            handle: "oolong-tea".to_owned(),
            tea_type: Some(TeaType::Oolong),
            category: None,
        },
        CollectionConfig {
            handle: "all-teas".to_owned(),
            tea_type: Some(TeaType::Black),
            category: None,
        },
    ];

    let catalog = fetch_vendor_teas(&test_client(), &v, &options(250))
        .await
        .unwrap();
    let types: Vec<(&str, TeaType)> = catalog
        .records
        .iter()
        .map(|t| (t.name.as_str(), t.tea_type))
        .collect();
    assert_eq!(
        types,
        vec![("Iron Goddess", TeaType::Oolong), ("Golden Yunnan", TeaType::Black)]
    );
}

#[tokio::test]
async fn failed_vendor_fetch_returns_error_not_partial_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let v = vendor("numi", &server.uri(), Platform::Shopify, CatalogKind::Teas);
    let result = fetch_vendor_teas(&test_client(), &v, &options(250)).await;
    assert!(matches!(
        result,
        Err(ScraperError::UnexpectedStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn html_vendor_merges_overlapping_collections() {
    let server = MockServer::start().await;

    for (collection, pages) in [
        ("black-tea", vec![listing(&["assam", "keemun"]), listing(&["assam"])]),
        ("oolong-tea", vec![listing(&["keemun", "dan-cong"]), String::new()]),
    ] {
        for (idx, body) in pages.into_iter().enumerate() {
            Mock::given(method("GET"))
                .and(path(format!("/collections/{collection}")))
                .and(query_param("page", (idx + 1).to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(&server)
                .await;
        }
    }

    for (handle, name) in [
        ("assam", "Assam Mokalbari"),
        ("keemun", "Keemun Mao Feng"),
        ("dan-cong", "Gift Sampler Box"),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/products/{handle}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<h1 class="product_name">{name}</h1><span class="price__current">$12.00</span>"#
            )))
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut v = vendor("steepingroom", &server.uri(), Platform::Html, CatalogKind::Teas);
    v.collections = vec![
        CollectionConfig {
            handle: "black-tea".to_owned(),
            tea_type: Some(TeaType::Black),
            category: None,
        },
        CollectionConfig {
            handle: "oolong-tea".to_owned(),
            tea_type: Some(TeaType::Oolong),
            category: None,
        },
    ];

    let catalog = fetch_vendor_teas(&test_client(), &v, &options(250))
        .await
        .unwrap();

    let names: Vec<(&str, TeaType)> = catalog
        .records
        .iter()
        .map(|t| (t.name.as_str(), t.tea_type))
        .collect();
    assert_eq!(
        names,
        vec![
            ("Assam Mokalbari", TeaType::Black),
            ("Keemun Mao Feng", TeaType::Black),
        ]
    );
    assert_eq!(catalog.filtered_out, 1);
    assert_eq!(catalog.records[0].price_usd, Some(12.0));
}

fn steeping_room(server: &MockServer) -> VendorConfig {
    let mut v = vendor("steepingroom", &server.uri(), Platform::Html, CatalogKind::Teas);
    v.collections = vec![CollectionConfig {
        handle: "black-tea".to_owned(),
        tea_type: Some(TeaType::Black),
        category: None,
    }];
    v
}

#[tokio::test]
async fn html_vendor_skips_a_delisted_product_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/black-tea"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&["assam", "gone"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/black-tea"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(String::new()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/assam"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<h1 class="product_name">Assam Mokalbari</h1><span class="price__current">$9.00</span>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let v = steeping_room(&server);
    let catalog = fetch_vendor_teas(&test_client_with_retries(2), &v, &options(250))
        .await
        .unwrap();
    assert_eq!(catalog.records.len(), 1);
    assert_eq!(catalog.records[0].name, "Assam Mokalbari");
    assert_eq!(catalog.invalid, 1);
}

#[tokio::test]
async fn html_vendor_fails_when_product_pages_stay_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/black-tea"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&["assam"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/black-tea"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(String::new()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/assam"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let v = steeping_room(&server);
    let result = fetch_vendor_teas(&test_client(), &v, &options(250)).await;
    assert!(matches!(
        result,
        Err(ScraperError::UnexpectedStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn collection_page_404_after_the_first_ends_the_walk() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/black-tea"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&["assam", "keemun"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/black-tea"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let links = test_client()
        .fetch_collection_links(&server.uri(), "black-tea", &options(250))
        .await
        .unwrap();
    assert_eq!(links.len(), 2);
    assert!(links[0].ends_with("/products/assam"));
}

#[tokio::test]
async fn collection_first_page_404_fails_the_walk() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/black-tea"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_collection_links(&server.uri(), "black-tea", &options(250))
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::NotFound { .. }), "got: {err:?}");
}

#[tokio::test]
async fn teaware_vendor_uses_category_hint_and_skips_gift_cards() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/gaiwans/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[
            (1, "Jingdezhen Porcelain Vessel 100ml"),
            (2, "E-Gift Card"),
        ])))
        .mount(&server)
        .await;

    let mut v = vendor("ys-teaware", &server.uri(), Platform::Shopify, CatalogKind::Teaware);
    v.slug = Some("yunnan-sourcing".to_owned());
    v.collections = vec![CollectionConfig {
        handle: "gaiwans".to_owned(),
        tea_type: None,
        category: Some(TeawareCategory::Gaiwan),
    }];

    let catalog = fetch_vendor_teaware(&test_client(), &v, &options(250))
        .await
        .unwrap();
    assert_eq!(catalog.records.len(), 1);
    assert_eq!(catalog.filtered_out, 1);
    let ware = &catalog.records[0];
    assert_eq!(ware.category, TeawareCategory::Gaiwan);
    assert_eq!(ware.slug, "yunnan-sourcing-jingdezhen-porcelain-vessel-100ml");
    assert_eq!(ware.capacity_ml, Some(100));
}

#[tokio::test]
async fn html_teaware_vendor_is_rejected() {
    let v = vendor("x", "https://x.example.com", Platform::Html, CatalogKind::Teaware);
    let result = fetch_vendor_teaware(&test_client(), &v, &options(250)).await;
    assert!(matches!(result, Err(ScraperError::InvalidStoreUrl { .. })));
}

// ---------------------------------------------------------------------------
// Company logos
// ---------------------------------------------------------------------------

#[tokio::test]
async fn logo_from_homepage_og_image() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<head><meta property="og:image" content="/files/brand.png"></head>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let logo = fetch_company_logo(&test_client(), &format!("{}/collections/all", server.uri()))
        .await
        .unwrap()
        .expect("logo found");
    assert_eq!(logo.source, LogoSource::OgImage);
    assert_eq!(logo.url, format!("{}/files/brand.png", server.uri()));
}

#[tokio::test]
async fn logo_falls_back_to_favicon_ico() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Welcome</p>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
        .expect(1)
        .mount(&server)
        .await;

    let logo = fetch_company_logo(&test_client(), &server.uri())
        .await
        .unwrap()
        .expect("favicon used");
    assert_eq!(logo.source, LogoSource::Favicon);
    assert_eq!(logo.url, format!("{}/favicon.ico", server.uri()));
}

#[tokio::test]
async fn no_logo_when_nothing_matches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Welcome</p>"))
        .mount(&server)
        .await;

    let logo = fetch_company_logo(&test_client(), &server.uri()).await.unwrap();
    assert!(logo.is_none());
}

#[tokio::test]
async fn unreachable_homepage_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = fetch_company_logo(&test_client(), &server.uri()).await.unwrap_err();
    assert!(matches!(err, ScraperError::UnexpectedStatus { status: 403, .. }));
}
