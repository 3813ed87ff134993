use sqlx::PgPool;
use teadb_core::{CatalogKind, Platform, RetryPolicy, VendorConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn company(key: &str, url: &str) -> VendorConfig {
    VendorConfig {
        key: key.to_string(),
        name: format!("{key} Tea Co"),
        slug: None,
        url: url.to_string(),
        platform: Platform::Shopify,
        catalog: CatalogKind::Teas,
        description: None,
        city: None,
        state: None,
        country: None,
        founded: None,
        specialty: vec![],
        collections: vec![],
    }
}

fn client() -> StorefrontClient {
    let retry = RetryPolicy {
        max_retries: 0,
        backoff_base_ms: 0,
    };
    StorefrontClient::new(5, "teadb-test/0.1", retry).unwrap()
}

async fn homepage(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

#[sqlx::test(migrations = "../../migrations")]
async fn fills_missing_logos_and_counts_failures(pool: PgPool) {
    let found = MockServer::start().await;
    homepage(
        &found,
        r#"<header><img class="site-header__logo" src="/files/logo.svg"></header>"#,
    )
    .await;
    let bare = MockServer::start().await;
    homepage(&bare, "<p>Welcome</p>").await;
    let down = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&down)
        .await;

    let vendors = vec![
        company("alpha", &found.uri()),
        company("beta", &bare.uri()),
        company("gamma", &down.uri()),
    ];
    teadb_db::seed_companies(&pool, &vendors).await.unwrap();

    let summary = fill_logos(&pool, &client(), Duration::ZERO, false).await.unwrap();
    assert_eq!(
        summary,
        LogoSummary {
            companies: 3,
            found: 1,
            saved: 1,
            missing: 1,
            failed: 1,
        }
    );

    let alpha = teadb_db::get_company_by_slug(&pool, "alpha-tea-co")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(alpha.logo_url, Some(format!("{}/files/logo.svg", found.uri())));

    // Companies that already have a logo are not looked up again.
    let remaining = teadb_db::list_companies_without_logo(&pool).await.unwrap();
    assert_eq!(remaining.len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn dry_run_saves_no_logo(pool: PgPool) {
    let server = MockServer::start().await;
    homepage(
        &server,
        r#"<meta property="og:image" content="https://cdn.example.com/brand.png">"#,
    )
    .await;
    teadb_db::seed_companies(&pool, &[company("alpha", &server.uri())])
        .await
        .unwrap();

    let summary = fill_logos(&pool, &client(), Duration::ZERO, true).await.unwrap();
    assert_eq!(summary.found, 1);
    assert_eq!(summary.saved, 0);
    assert_eq!(
        teadb_db::list_companies_without_logo(&pool).await.unwrap().len(),
        1
    );
}
