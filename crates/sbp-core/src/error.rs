//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// The top-level error type for `sbp-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The run cannot start with this configuration (e.g. a start year before
    /// the earliest year the datasets support).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Shorthand result type for all `sbp-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
