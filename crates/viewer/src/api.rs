//! HTTP client for the board's read endpoints.
//!
//! All endpoints answer with a `{"data": ...}` envelope.

use orderboard_core::order::OrderRecord;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ViewerError;

#[derive(Debug, Deserialize)]
struct DataResponse<T> {
    data: T,
}

/// Everything a viewer draws, fetched in one go.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardSnapshot {
    /// Preparing orders, oldest first.
    pub preparing: Vec<OrderRecord>,
    /// Ready orders, most recent first.
    pub ready: Vec<OrderRecord>,
    /// The most recently ready order.
    pub latest_ready: Option<OrderRecord>,
}

impl BoardSnapshot {
    pub fn latest_ready_id(&self) -> Option<orderboard_core::types::DbId> {
        self.latest_ready.as_ref().map(|order| order.id)
    }
}

/// HTTP client for one board server.
pub struct BoardApi {
    client: reqwest::Client,
    base_url: String,
}

impl BoardApi {
    /// * `base_url` - HTTP base URL, e.g. `http://host:3001`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// `GET /api/v1/orders/preparing?limit=`
    pub async fn fetch_preparing(&self, limit: usize) -> Result<Vec<OrderRecord>, ViewerError> {
        self.get(&format!("/api/v1/orders/preparing?limit={limit}"))
            .await
    }

    /// `GET /api/v1/orders/ready?limit=`
    pub async fn fetch_ready(&self, limit: usize) -> Result<Vec<OrderRecord>, ViewerError> {
        self.get(&format!("/api/v1/orders/ready?limit={limit}")).await
    }

    /// `GET /api/v1/orders/ready/latest`
    pub async fn fetch_latest_ready(&self) -> Result<Option<OrderRecord>, ViewerError> {
        self.get("/api/v1/orders/ready/latest").await
    }

    /// Fetch all three lists concurrently.
    ///
    /// `ready_limit` counts the highlighted order too, so callers pass one
    /// more than the number of plain ready rows they draw.
    pub async fn fetch_snapshot(
        &self,
        preparing_limit: usize,
        ready_limit: usize,
    ) -> Result<BoardSnapshot, ViewerError> {
        let (preparing, ready, latest_ready) = tokio::try_join!(
            self.fetch_preparing(preparing_limit),
            self.fetch_ready(ready_limit),
            self.fetch_latest_ready(),
        )?;

        Ok(BoardSnapshot {
            preparing,
            ready,
            latest_ready,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ViewerError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ViewerError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: DataResponse<T> = response.json().await?;
        Ok(envelope.data)
    }
}
