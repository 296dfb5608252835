//! Repository for the `orders` table.

use orderboard_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::order::{CreateOrder, OrderRow};

/// Column list for `orders` queries.
const COLUMNS: &str = "id, customer_name, placed_at, preparing_at, ready_at";

/// Read queries for the board, plus the inserts and ready transitions that
/// load orders into the table.
pub struct OrderRepo;

impl OrderRepo {
    /// Orders whose preparing or ready timestamp is strictly after `watermark`,
    /// most recent change first.
    pub async fn list_changed_since(
        pool: &PgPool,
        watermark: Timestamp,
    ) -> Result<Vec<OrderRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders \
             WHERE preparing_at > $1 OR ready_at > $1 \
             ORDER BY GREATEST( \
                 COALESCE(preparing_at, 'epoch'::timestamptz), \
                 COALESCE(ready_at, 'epoch'::timestamptz) \
             ) DESC"
        );
        sqlx::query_as::<_, OrderRow>(&query)
            .bind(watermark)
            .fetch_all(pool)
            .await
    }

    /// Orders in preparation (not yet ready), oldest first.
    pub async fn list_preparing(pool: &PgPool, limit: i64) -> Result<Vec<OrderRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders \
             WHERE preparing_at IS NOT NULL AND ready_at IS NULL \
             ORDER BY preparing_at ASC, id ASC LIMIT $1"
        );
        sqlx::query_as::<_, OrderRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Ready orders, most recently ready first.
    ///
    /// Rows that break the order invariants are filtered here, before the
    /// limit, so a bad row never hides a valid one.
    pub async fn list_ready(pool: &PgPool, limit: i64) -> Result<Vec<OrderRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders \
             WHERE ready_at IS NOT NULL \
               AND preparing_at IS NOT NULL \
               AND ready_at >= preparing_at \
             ORDER BY ready_at DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, OrderRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Insert a new order, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateOrder) -> Result<OrderRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO orders (customer_name, preparing_at, ready_at) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OrderRow>(&query)
            .bind(&input.customer_name)
            .bind(input.preparing_at)
            .bind(input.ready_at)
            .fetch_one(pool)
            .await
    }

    /// Mark an order ready at `at`. Returns `None` if the order does not exist
    /// or is already ready.
    pub async fn mark_ready(
        pool: &PgPool,
        id: DbId,
        at: Timestamp,
    ) -> Result<Option<OrderRow>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET ready_at = $2 WHERE id = $1 AND ready_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OrderRow>(&query)
            .bind(id)
            .bind(at)
            .fetch_optional(pool)
            .await
    }
}
