use crate::types::DbId;

/// Domain-level errors raised by `orderboard_core` constructors and validators.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Order {id} is inconsistent: {reason}")]
    InvalidOrder { id: DbId, reason: String },
}

/// Errors surfaced by a [`RecordStore`](crate::store::RecordStore).
///
/// `Unavailable` is transient: the poller retries on its next cycle and holds
/// the watermark back. `MalformedRecord` concerns a single row; callers skip
/// the row and keep the rest of the batch.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed record {id}: {reason}")]
    MalformedRecord { id: DbId, reason: String },
}

