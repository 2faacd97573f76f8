use std::time::Duration;

/// Header the node reads its API token from unless configured otherwise.
pub const DEFAULT_TOKEN_HEADER: &str = "X-Algo-API-Token";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Node base URL, e.g. `http://127.0.0.1:4001`. A path prefix is kept.
    pub base_url: String,
    pub token: Option<String>,
    pub token_header: String,
    pub connect_timeout: Option<Duration>,
    /// Whole-request timeout; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    /// Sent with every request unless the request sets the same header (case-insensitive).
    pub default_headers: Vec<(String, String)>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
            connect_timeout: Some(Duration::from_secs(3)),
            request_timeout: None,
            default_headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_token_header(mut self, name: impl Into<String>) -> Self {
        self.token_header = name.into();
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }
}
