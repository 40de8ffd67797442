use std::time::Duration;

/// Default bound on connection establishment. Stream duration is
/// deliberately unbounded so long generations are never cut off.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Transport configuration for API requests.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bearer token passed to `Authorization`.
    pub api_key: String,
    /// Optional base URL override; `None` means the default provider root.
    pub base_url: Option<String>,
    /// Bound on connection/header time only, never on stream duration.
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
