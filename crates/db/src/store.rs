//! PostgreSQL-backed [`RecordStore`].

use async_trait::async_trait;
use orderboard_core::error::StoreError;
use orderboard_core::order::OrderRecord;
use orderboard_core::store::RecordStore;
use orderboard_core::types::Timestamp;

use crate::models::order::OrderRow;
use crate::repositories::OrderRepo;
use crate::DbPool;

/// The production record store adapter.
///
/// Query failures surface as [`StoreError::Unavailable`]. Rows violating the
/// order invariants are skipped with a warning and the rest of the batch is
/// returned.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: DbPool,
}

impl PgRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn fetch_changed_since(
        &self,
        watermark: Timestamp,
    ) -> Result<Vec<OrderRecord>, StoreError> {
        let rows = OrderRepo::list_changed_since(&self.pool, watermark)
            .await
            .map_err(unavailable)?;
        Ok(into_records(rows))
    }

    async fn fetch_ready(&self, limit: i64) -> Result<Vec<OrderRecord>, StoreError> {
        let rows = OrderRepo::list_ready(&self.pool, limit)
            .await
            .map_err(unavailable)?;
        Ok(into_records(rows))
    }

    async fn fetch_preparing(&self, limit: i64) -> Result<Vec<OrderRecord>, StoreError> {
        let rows = OrderRepo::list_preparing(&self.pool, limit)
            .await
            .map_err(unavailable)?;
        Ok(into_records(rows))
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

/// Convert rows, skipping (and logging) the ones that fail validation.
pub fn into_records(rows: Vec<OrderRow>) -> Vec<OrderRecord> {
    rows.into_iter()
        .filter_map(|row| match OrderRecord::try_from(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed order row");
                None
            }
        })
        .collect()
}
