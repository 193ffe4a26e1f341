//! Unified error handling for the sync client.

use crate::remote::RemoteError;
use crate::store::StorageError;
use campo_engine::PendingWork;

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Engine error: {0}")]
    Engine(#[from] campo_engine::Error),

    /// Period closure attempted while records still await sync.
    #[error("Period closure blocked: {0}")]
    ClosureBlocked(PendingWork),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, SyncError>;
