//! Error types for level and settings loading
//!
//! Geometry never fails: misses and degenerate shapes are `None` results.
//! Only external inputs (files, JSON) produce errors.

use thiserror::Error;

/// Errors raised while loading or validating a level layout
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed level JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A coordinate or size is NaN or infinite
    #[error("{what} has a non-finite coordinate")]
    NonFinite { what: String },

    #[error("{what} has a negative size")]
    NegativeSize { what: String },

    /// Fewer than three distinct vertices
    #[error("polygon {index} needs at least 3 distinct vertices, found {found}")]
    DegeneratePolygon { index: usize, found: usize },

    #[error("{what} uses group id {id}, expected 0..{max}")]
    GroupOutOfRange { what: String, id: usize, max: usize },
}

/// Errors raised while loading tuning settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
