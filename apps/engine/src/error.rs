//! Error handling for the scheduling engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine error taxonomy.
///
/// Store errors propagate unchanged; the operation that hit one is
/// considered not-yet-applied. Transport errors do not roll back
/// queue state (redelivery is the transport's concern).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Notification delivery failures.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("delivery to user {user} failed: {reason}")]
    DeliveryFailed { user: i64, reason: String },
}
