//! Error types.
//!
//! Every variant describes bad caller input and is raised before the first
//! generation runs. Population drift inside a run is repaired by gap-filling
//! and never reported through this type.

use thiserror::Error;

use crate::catalog::Attribute;

/// Errors returned at the crate boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimetableError {
    /// Fewer than two offerings were supplied.
    #[error("at least 2 offerings are required, got {found}")]
    InsufficientInput { found: usize },

    /// A tuning parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The catalog has no legal values for a mutable attribute.
    #[error("catalog has no values for attribute `{attribute}`")]
    CatalogIncomplete { attribute: Attribute },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TimetableError>;
