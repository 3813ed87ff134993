use std::time::Duration;

use teadb_core::Transient;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("normalization error for product {product}: {reason}")]
    Normalization { product: String, reason: String },

    #[error("pagination limit reached for {store_url}: exceeded {max_pages} pages")]
    PaginationLimit { store_url: String, max_pages: usize },

    #[error("invalid store URL \"{store_url}\": {reason}")]
    InvalidStoreUrl { store_url: String, reason: String },
}

impl Transient for ScraperError {
    /// 429, network-level failures, and 5xx are retried. 404, other 4xx,
    /// malformed bodies, and the pagination guard are not.
    fn is_transient(&self) -> bool {
        match self {
            ScraperError::RateLimited { .. } => true,
            ScraperError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
            ScraperError::Deserialize { .. }
            | ScraperError::NotFound { .. }
            | ScraperError::Normalization { .. }
            | ScraperError::PaginationLimit { .. }
            | ScraperError::InvalidStoreUrl { .. } => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            ScraperError::RateLimited {
                retry_after_secs, ..
            } => Some(Duration::from_secs(*retry_after_secs)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_is_transient() {
        let err = ScraperError::RateLimited {
            domain: "numitea.com".to_owned(),
            retry_after_secs: 5,
        };
        assert!(err.is_transient());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn server_errors_are_transient_client_errors_are_not() {
        let server = ScraperError::UnexpectedStatus {
            status: 503,
            url: "https://numitea.com/products.json".to_owned(),
        };
        let client = ScraperError::UnexpectedStatus {
            status: 403,
            url: "https://numitea.com/products.json".to_owned(),
        };
        assert!(server.is_transient());
        assert!(!client.is_transient());
        assert_eq!(server.retry_after(), None);
    }

    #[test]
    fn not_found_and_parse_failures_are_permanent() {
        assert!(!ScraperError::NotFound {
            url: "https://numitea.com/products.json".to_owned()
        }
        .is_transient());
        let src = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        assert!(!ScraperError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }
        .is_transient());
    }
}
