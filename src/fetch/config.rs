use std::time::Duration;

/// Default endpoint: the `JSONPlaceholder` todo collection.
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/todos";

/// Where and how an [`HttpFetcher`](super::HttpFetcher) requests its collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// URL of the JSON collection.
    pub endpoint: String,

    /// Maximum number of items to request, sent as the `_limit` query parameter.
    pub limit: Option<usize>,

    /// Upper bound on the whole request, including reading the body.
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            limit: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl FetchConfig {
    /// Creates a configuration for the given endpoint with default limit and timeout.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
