use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for a single in-store deployment.
/// Override via environment variables (or a `.env` file).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Outbound queue size per viewer connection (default: `32`).
    pub viewer_queue_capacity: usize,
    /// Maximum preparing orders returned by the fetch endpoint (default: `20`).
    pub preparing_limit: i64,
    /// Maximum ready orders returned by the fetch endpoint (default: `10`).
    pub ready_limit: i64,
    /// Directory holding a built frontend to serve for non-API paths.
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                                       |
    /// |-------------------------|-----------------------------------------------|
    /// | `HOST`                  | `0.0.0.0`                                     |
    /// | `PORT`                  | `3001`                                        |
    /// | `CORS_ORIGINS`          | `http://localhost:5173,http://127.0.0.1:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                                          |
    /// | `VIEWER_QUEUE_CAPACITY` | `32`                                          |
    /// | `PREPARING_LIMIT`       | `20`                                          |
    /// | `READY_LIMIT`           | `10`                                          |
    /// | `STATIC_DIR`            | unset                                         |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3001".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let viewer_queue_capacity: usize = std::env::var("VIEWER_QUEUE_CAPACITY")
            .unwrap_or_else(|_| "32".into())
            .parse()
            .expect("VIEWER_QUEUE_CAPACITY must be a valid usize");
        assert!(viewer_queue_capacity > 0, "VIEWER_QUEUE_CAPACITY must be positive");

        let preparing_limit: i64 = std::env::var("PREPARING_LIMIT")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("PREPARING_LIMIT must be a valid i64");

        let ready_limit: i64 = std::env::var("READY_LIMIT")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("READY_LIMIT must be a valid i64");

        let static_dir = std::env::var("STATIC_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            viewer_queue_capacity,
            preparing_limit,
            ready_limit,
            static_dir,
        }
    }
}
