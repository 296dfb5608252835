//! Shared query parameter types for API handlers.

use orderboard_core::error::CoreError;
use serde::Deserialize;

/// `?limit=` for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

impl LimitParams {
    /// Resolve the requested limit against the configured maximum.
    ///
    /// Missing means `max`; values above `max` are capped; zero or negative
    /// values are rejected.
    pub fn resolve(&self, max: i64) -> Result<i64, CoreError> {
        match self.limit {
            None => Ok(max),
            Some(n) if n < 1 => Err(CoreError::Validation(format!(
                "limit must be at least 1, got {n}"
            ))),
            Some(n) => Ok(n.min(max)),
        }
    }
}
