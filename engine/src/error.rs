//! Error types for the Campo engine.

use crate::PropertyId;
use thiserror::Error;

/// All possible errors from the Campo engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A capture referenced a property absent from the local snapshot.
    #[error("property not found: {0}")]
    PropertyNotFound(PropertyId),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
