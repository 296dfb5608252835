//! Read-only interface over the order records.
//!
//! The change poller and the viewer-facing fetch endpoints only ever talk to
//! this trait; the PostgreSQL implementation lives in `orderboard_db`.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::order::OrderRecord;
use crate::types::Timestamp;

/// Contract for the backing order store.
///
/// Implementations must fail with [`StoreError::Unavailable`] rather than
/// return a partial result when the underlying query fails.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Orders whose preparing or ready timestamp is strictly after `watermark`.
    async fn fetch_changed_since(
        &self,
        watermark: Timestamp,
    ) -> Result<Vec<OrderRecord>, StoreError>;

    /// Up to `limit` ready orders, most recently ready first.
    async fn fetch_ready(&self, limit: i64) -> Result<Vec<OrderRecord>, StoreError>;

    /// Up to `limit` preparing orders, oldest first.
    async fn fetch_preparing(&self, limit: i64) -> Result<Vec<OrderRecord>, StoreError>;

    /// The single most recently ready order, if any.
    async fn fetch_latest_ready(&self) -> Result<Option<OrderRecord>, StoreError> {
        Ok(self.fetch_ready(1).await?.into_iter().next())
    }
}
