use std::time::Duration;

/// Configuration for query behavior.
///
/// This controls how queries cache data, when they consider it stale, and
/// whether they revalidate on a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// How long data is considered fresh before becoming stale.
    ///
    /// Fresh cached data is shown without refetching. Stale cached data is shown
    /// immediately and refetched in the background.
    pub stale_time: Duration,

    /// How long cached data is retained before
    /// [`QueryClient::collect_garbage`](super::QueryClient::collect_garbage) drops it.
    pub cache_time: Duration,

    /// When set, active queries revalidate their data at this period.
    pub refetch_interval: Option<Duration>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(0),      // immediately stale
            cache_time: Duration::from_secs(5 * 60), // 5 minutes
            refetch_interval: None,
        }
    }
}

impl QueryConfig {
    /// Creates a new query configuration with the given stale and cache times.
    #[must_use]
    pub const fn new(stale_time: Duration, cache_time: Duration) -> Self {
        Self {
            stale_time,
            cache_time,
            refetch_interval: None,
        }
    }

    /// Revalidates active queries every `interval`.
    #[must_use]
    pub const fn with_refetch_interval(mut self, interval: Duration) -> Self {
        self.refetch_interval = Some(interval);
        self
    }
}
