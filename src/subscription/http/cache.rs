use std::any::Any;
use std::time::{Duration, Instant};

/// A cached entry with timestamp and staleness information.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: Instant,
    pub is_stale: bool,
}

/// A cache entry whose data type is only known to the query that stored it.
pub type ErasedEntry = CacheEntry<Box<dyn Any + Send + Sync>>;

impl<T> CacheEntry<T> {
    /// Creates a new cache entry with the given data.
    pub fn new(data: T) -> Self {
        Self {
            data,
            timestamp: Instant::now(),
            is_stale: false,
        }
    }

    /// Checks if this entry is stale based on the given stale time.
    ///
    /// An entry marked stale stays stale until it is replaced.
    pub fn check_staleness(&mut self, stale_time: Duration) -> bool {
        if self.timestamp.elapsed() > stale_time {
            self.is_stale = true;
        }
        self.is_stale
    }

    /// Marks this entry as stale.
    pub const fn mark_stale(&mut self) {
        self.is_stale = true;
    }

    /// Checks if this entry should be garbage collected based on cache time.
    pub fn should_gc(&self, cache_time: Duration) -> bool {
        self.timestamp.elapsed() > cache_time
    }
}

impl<T: Send + Sync + 'static> CacheEntry<T> {
    /// Hides the data type so entries of different queries share one map.
    pub fn erase(self) -> ErasedEntry {
        CacheEntry {
            data: Box::new(self.data),
            timestamp: self.timestamp,
            is_stale: self.is_stale,
        }
    }
}

impl ErasedEntry {
    /// Recovers a typed copy of the entry, or `None` if it holds another type.
    pub fn downcast<T: Clone + 'static>(&self) -> Option<CacheEntry<T>> {
        self.data.downcast_ref::<T>().map(|data| CacheEntry {
            data: data.clone(),
            timestamp: self.timestamp,
            is_stale: self.is_stale,
        })
    }
}
