//! Error types for the loading and collaborator boundaries
//!
//! The numeric core never fails: degenerate inputs become warnings on the
//! result. Only reading a catalog and talking to an enrichment collaborator
//! can produce an `Err`.

use thiserror::Error;

/// Errors that can occur while loading a metric catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML catalog: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Failed to parse JSON catalog: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unsupported catalog format: {0} (expected .toml or .json)")]
    UnsupportedFormat(String),

    #[error("Invalid observation #{index} ({metric}/{real_estate}): {reason}")]
    InvalidObservation {
        index: usize,
        metric: String,
        real_estate: String,
        reason: String,
    },
}

/// Errors reported by an optional warning-enrichment collaborator
///
/// These never reach the caller of a calculation; see
/// [`crate::enrichment::enrich_warnings`].
#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("Enrichment service unavailable: {0}")]
    Unavailable(String),

    #[error("Enrichment service rejected the request: {0}")]
    Rejected(String),
}
