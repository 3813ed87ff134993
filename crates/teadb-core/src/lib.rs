//! Shared domain types, configuration, and utilities for the tea catalog
//! ingestion pipeline.

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod retry;
pub mod taxonomy;
pub mod vendors;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{
    name_key, slugify, NormalizedTea, NormalizedTeaware, SteepingParams, SLUG_MAX_CHARS,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use retry::{retry_with_backoff, RetryPolicy, Transient};
pub use taxonomy::{ClayType, TeaType, TeawareCategory, TeawareMaterial};
pub use vendors::{
    load_vendors, CatalogKind, CollectionConfig, Platform, VendorConfig, VendorSelection,
    VendorsFile,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read vendors file {path}: {source}")]
    VendorsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse vendors file: {0}")]
    VendorsFileParse(#[from] serde_yaml::Error),

    #[error("vendor config validation failed: {0}")]
    Validation(String),
}
