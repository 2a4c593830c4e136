//! Error types for vocatrain-core.

use thiserror::Error;

/// Result type alias using EngineError.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised by the drilling engine proper.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// No catalog item matches the active session filters. Callers should
    /// surface a "no items available" state rather than crash.
    #[error("no items match the active filters")]
    EmptyPool,

    /// An operation referenced an item id the progress store does not know.
    /// This is a caller precondition violation, not a runtime condition.
    #[error("no progress record for item {id}")]
    UnknownItem { id: String },
}

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid JSON catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV catalog has no header row")]
    MissingHeader,
}
