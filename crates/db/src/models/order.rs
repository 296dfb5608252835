//! Order row model.

use orderboard_core::error::{CoreError, StoreError};
use orderboard_core::order::OrderRecord;
use orderboard_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `orders` table, before invariant checks.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: DbId,
    pub customer_name: Option<String>,
    pub placed_at: Option<Timestamp>,
    pub preparing_at: Option<Timestamp>,
    pub ready_at: Option<Timestamp>,
}

/// DTO for inserting an order.
#[derive(Debug, Clone, Default)]
pub struct CreateOrder {
    pub customer_name: Option<String>,
    pub preparing_at: Option<Timestamp>,
    pub ready_at: Option<Timestamp>,
}

impl TryFrom<OrderRow> for OrderRecord {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        OrderRecord::new(
            row.id,
            row.customer_name,
            row.placed_at,
            row.preparing_at,
            row.ready_at,
        )
        .map_err(|err| match err {
            CoreError::InvalidOrder { id, reason } => StoreError::MalformedRecord { id, reason },
            other => StoreError::MalformedRecord {
                id: row.id,
                reason: other.to_string(),
            },
        })
    }
}
