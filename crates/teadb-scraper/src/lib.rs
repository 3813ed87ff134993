pub mod catalog;
pub mod client;
pub mod error;
pub mod filter;
pub mod html;
pub mod logo;
pub mod normalize;
pub mod pagination;
pub mod parse;
pub mod rules;
pub mod types;

pub use catalog::{fetch_vendor_teas, fetch_vendor_teaware, FetchedCatalog};
pub use client::{FetchOptions, ProductPages, StorefrontClient};
pub use error::ScraperError;
pub use filter::is_tea_product;
pub use logo::{fetch_company_logo, CompanyLogo, LogoSource};
pub use normalize::{normalize_html_tea, normalize_tea, normalize_teaware};
pub use rules::classify_tea_type;
pub use types::{HtmlProduct, ShopifyProduct, ShopifyProductsResponse, ShopifyVariant};
