use std::path::Path;

use super::*;

fn vendor(key: &str, name: &str) -> VendorConfig {
    VendorConfig {
        key: key.to_string(),
        name: name.to_string(),
        slug: None,
        url: format!("https://{key}.example.com"),
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

#[test]
fn slug_derived_from_name() {
    assert_eq!(vendor("numi", "Numi Organic Tea").slug(), "numi-organic-tea");
}

#[test]
fn slug_drops_punctuation_and_maps_ampersand() {
    assert_eq!(vendor("harney", "Harney & Sons").slug(), "harney-sons");
    assert_eq!(vendor("churchills", "Churchill's Tea").slug(), "churchills-tea");
}

#[test]
fn slug_strips_non_ascii() {
    assert_eq!(vendor("teaforte", "Tea Forté").slug(), "tea-fort");
    assert_eq!(vendor("mariage", "Mariage Frères").slug(), "mariage-fr-res");
}

#[test]
fn explicit_slug_wins() {
    let mut v = vendor("teaforte", "Tea Forté");
    v.slug = Some("tea-forte".to_string());
    assert_eq!(v.slug(), "tea-forte");
    assert_eq!(v.lock_name(), "teadb:vendor:tea-forte");
}

#[test]
fn blank_explicit_slug_falls_back_to_name() {
    let mut v = vendor("bigelow", "Bigelow Tea");
    v.slug = Some("  ".to_string());
    assert_eq!(v.slug(), "bigelow-tea");
}

#[test]
fn validate_rejects_empty_name() {
    let file = VendorsFile {
        vendors: vec![vendor("x", "  ")],
    };
    let err = validate_vendors(&file).unwrap_err();
    assert!(err.to_string().contains("empty name"));
}

#[test]
fn validate_rejects_non_http_url() {
    let mut v = vendor("x", "X Tea");
    v.url = "ftp://x.example.com".to_string();
    let err = validate_vendors(&VendorsFile { vendors: vec![v] }).unwrap_err();
    assert!(err.to_string().contains("invalid url"));
}

#[test]
fn validate_rejects_html_vendor_without_collections() {
    let mut v = vendor("steepingroom", "The Steeping Room");
    v.platform = Platform::Html;
    let err = validate_vendors(&VendorsFile { vendors: vec![v] }).unwrap_err();
    assert!(err.to_string().contains("at least one collection"));
}

#[test]
fn validate_rejects_duplicate_keys_case_insensitively() {
    let file = VendorsFile {
        vendors: vec![vendor("numi", "Numi Tea"), vendor("NUMI", "Numi Other")],
    };
    let err = validate_vendors(&file).unwrap_err();
    assert!(err.to_string().contains("duplicate vendor key"));
}

#[test]
fn validate_rejects_duplicate_slugs() {
    let file = VendorsFile {
        vendors: vec![vendor("a", "Same Name"), vendor("b", "Same  Name")],
    };
    let err = validate_vendors(&file).unwrap_err();
    assert!(err.to_string().contains("duplicate teas vendor slug"));
}

#[test]
fn same_slug_allowed_across_catalogs() {
    let mut teaware = vendor("ys-teaware", "Yunnan Sourcing");
    teaware.catalog = CatalogKind::Teaware;
    let file = VendorsFile {
        vendors: vec![vendor("ys", "Yunnan Sourcing"), teaware],
    };
    assert!(validate_vendors(&file).is_ok());
}

#[test]
fn validate_accepts_distinct_vendors() {
    let file = VendorsFile {
        vendors: vec![vendor("numi", "Numi Organic Tea"), vendor("stash", "Stash Tea")],
    };
    assert!(validate_vendors(&file).is_ok());
}

#[test]
fn select_all_of_catalog_when_no_keys() {
    let mut teaware = vendor("crimson", "Crimson Lotus Tea");
    teaware.catalog = CatalogKind::Teaware;
    let file = VendorsFile {
        vendors: vec![vendor("numi", "Numi"), teaware, vendor("stash", "Stash")],
    };
    let sel = file.select(CatalogKind::Teas, &[]);
    let keys: Vec<&str> = sel.vendors.iter().map(|v| v.key.as_str()).collect();
    assert_eq!(keys, vec!["numi", "stash"]);
    assert!(sel.unknown.is_empty());
}

#[test]
fn select_reports_unknown_keys_and_dedups() {
    let file = VendorsFile {
        vendors: vec![vendor("numi", "Numi"), vendor("stash", "Stash")],
    };
    let keys = vec![
        "Stash".to_string(),
        "nope".to_string(),
        "stash".to_string(),
    ];
    let sel = file.select(CatalogKind::Teas, &keys);
    assert_eq!(sel.vendors.len(), 1);
    assert_eq!(sel.vendors[0].key, "stash");
    assert_eq!(sel.unknown, vec!["nope".to_string()]);
}

#[test]
fn select_treats_other_catalog_key_as_unknown() {
    let file = VendorsFile {
        vendors: vec![vendor("numi", "Numi")],
    };
    let sel = file.select(CatalogKind::Teaware, &["numi".to_string()]);
    assert!(sel.vendors.is_empty());
    assert_eq!(sel.unknown, vec!["numi".to_string()]);
}

#[test]
fn parses_yaml_with_collections_and_hints() {
    let yaml = r"
vendors:
  - key: steepingroom
    name: The Steeping Room
    url: https://www.thesteepingroom.com
    platform: html
    catalog: teas
    collections:
      - handle: black-tea
        tea_type: black
      - handle: puerh-and-heicha
        tea_type: puerh
";
    let file: VendorsFile = serde_yaml::from_str(yaml).unwrap();
    validate_vendors(&file).unwrap();
    let v = &file.vendors[0];
    assert_eq!(v.platform, Platform::Html);
    assert_eq!(v.collections.len(), 2);
    assert_eq!(v.collections[1].tea_type, Some(crate::TeaType::Puerh));
    assert!(v.collections[0].category.is_none());
}

#[test]
fn load_vendors_missing_file_is_io_error() {
    let err = load_vendors(Path::new("/nonexistent/vendors.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::VendorsFileIo { .. }));
}

#[test]
fn load_vendors_from_repo_config() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/vendors.yaml");
    let file = load_vendors(&path).expect("repo vendors.yaml should be valid");
    assert!(file
        .vendors
        .iter()
        .any(|v| v.catalog == CatalogKind::Teas && v.platform == Platform::Shopify));
    assert!(file
        .vendors
        .iter()
        .any(|v| v.catalog == CatalogKind::Teaware));
    assert!(file.vendors.iter().any(|v| v.platform == Platform::Html));
}
