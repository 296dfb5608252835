/// Viewer configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// HTTP base URL of the board server, without a trailing slash.
    pub base_url: String,
    /// Preparing orders shown on screen.
    pub preparing_rows: usize,
    /// Ready orders shown below the highlighted one.
    pub ready_rows: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            preparing_rows: 5,
            ready_rows: 3,
        }
    }
}

impl ViewerConfig {
    /// Load configuration from environment variables, falling back to
    /// sensible defaults for local development.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `ORDERBOARD_URL`        | `http://localhost:3001` |
    /// | `VIEWER_PREPARING_ROWS` | `5`                     |
    /// | `VIEWER_READY_ROWS`     | `3`                     |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = std::env::var("ORDERBOARD_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);

        let preparing_rows: usize = std::env::var("VIEWER_PREPARING_ROWS")
            .unwrap_or_else(|_| defaults.preparing_rows.to_string())
            .parse()
            .expect("VIEWER_PREPARING_ROWS must be a valid usize");

        let ready_rows: usize = std::env::var("VIEWER_READY_ROWS")
            .unwrap_or_else(|_| defaults.ready_rows.to_string())
            .parse()
            .expect("VIEWER_READY_ROWS must be a valid usize");

        Self {
            base_url,
            preparing_rows,
            ready_rows,
        }
    }

    /// WebSocket URL of the board's signal endpoint.
    pub fn ws_url(&self) -> String {
        let base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        format!("{base}/api/v1/ws")
    }
}
