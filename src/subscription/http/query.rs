//! HTTP query operations with caching and automatic refetching.
//!
//! This module provides the [`Query`] subscription and [`QueryClient`] for
//! managing GET requests with built-in caching.
//!
//! # Design Pattern: Subscription-based State Management
//!
//! Queries are **subscriptions** that keep monitoring their cache entry. When you
//! subscribe to a query:
//!
//! 1. If fresh cached data exists, it's emitted and no request is made
//! 2. If cached data is stale, it's emitted and refetched in the background
//! 3. If there is no data, `Loading` is emitted and a fetch starts
//! 4. When the key is invalidated, `Loading` is emitted and the query refetches
//! 5. With a refetch interval, the data is revalidated periodically
//!
//! A component only sees [`QueryResult`]s; whether a result came from the cache
//! or the network is the client's business.

use std::any::{Any, TypeId};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, FutureExt, Shared};
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::Command;
use crate::fetch::{FetchFailure, Fetcher, ViewState};
use crate::subscription::{SubscriptionId, SubscriptionSource};

use super::cache::{CacheEntry, ErasedEntry};
use super::config::QueryConfig;

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, FetchFailure>>>;

/// A cache slot: the query key plus the type of value stored under it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    key: String,
    value_type: TypeId,
}

impl CacheKey {
    fn new<V: 'static>(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value_type: TypeId::of::<V>(),
        }
    }
}

/// A request in flight, shared by every query awaiting the same slot.
#[derive(Debug)]
struct Pending {
    id: u64,
    fetch: Box<dyn Any + Send + Sync>,
}

/// One awaiter's hold on a [`Pending`] fetch.
///
/// Dropping the last hold before the fetch finishes abandons the request, so
/// the next query for the slot starts a new one.
struct InFlight<'a, V: 'static> {
    table: &'a DashMap<CacheKey, Pending>,
    slot: CacheKey,
    id: u64,
    fetch: SharedFetch<V>,
}

impl<V: 'static> InFlight<'_, V> {
    /// Removes the table entry once the fetch finished. Returns `false` if
    /// another awaiter already did.
    fn release(&self) -> bool {
        self.table
            .remove_if(&self.slot, |_, pending| pending.id == self.id)
            .is_some()
    }
}

impl<V: 'static> Drop for InFlight<'_, V> {
    fn drop(&mut self) {
        // A completed handle has nothing left to abandon.
        if self.fetch.strong_count().is_none() {
            return;
        }
        // The table holds one handle and this awaiter the other.
        let abandoned = self.table.remove_if(&self.slot, |_, pending| {
            pending.id == self.id
                && self.fetch.strong_count() == Some(2)
                && pending
                    .fetch
                    .downcast_ref::<SharedFetch<V>>()
                    .is_some_and(|fetch| fetch.peek().is_none())
        });
        if abandoned.is_some() {
            debug!(key = %self.slot.key, "abandoned in-flight fetch");
        }
    }
}

/// The state of a query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState<T> {
    /// Query is loading (fetching data).
    Loading,
    /// Query succeeded with data.
    Success {
        /// The data returned by the query.
        data: T,
        /// Whether the data is stale and being refetched.
        is_stale: bool,
    },
    /// Query failed.
    Error(FetchFailure),
}

/// A query result containing the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult<T> {
    /// The current state of the query.
    pub state: QueryState<T>,
}

impl<T> QueryResult<T> {
    const fn loading() -> Self {
        Self {
            state: QueryState::Loading,
        }
    }

    const fn success(data: T, is_stale: bool) -> Self {
        Self {
            state: QueryState::Success { data, is_stale },
        }
    }

    const fn error(failure: FetchFailure) -> Self {
        Self {
            state: QueryState::Error(failure),
        }
    }

    /// Returns the data if the query succeeded, otherwise `None`.
    pub const fn data(&self) -> Option<&T> {
        match &self.state {
            QueryState::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Returns `true` if the query is currently loading.
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, QueryState::Loading)
    }

    /// Returns `true` if the query succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self.state, QueryState::Success { .. })
    }

    /// Returns `true` if the query failed.
    pub const fn is_error(&self) -> bool {
        matches!(self.state, QueryState::Error(_))
    }

    /// Returns `true` if the query data is stale.
    pub const fn is_stale(&self) -> bool {
        matches!(self.state, QueryState::Success { is_stale: true, .. })
    }
}

impl<T> QueryState<T> {
    /// The renderable view of this state. Staleness is not part of the view.
    pub fn view(&self) -> ViewState<&T> {
        match self {
            Self::Loading => ViewState::Loading,
            Self::Success { data, .. } => ViewState::Success(data),
            Self::Error(failure) => ViewState::Error(failure.clone()),
        }
    }
}

/// A client for managing the query cache and invalidation.
///
/// The `QueryClient` is the central state manager for queries. It handles:
/// - Caching query results
/// - Broadcasting invalidation notifications
/// - Sharing in-flight requests between queries with the same key
/// - Configuration management
///
/// # Example
///
/// ```rust
/// use tears_fetch::subscription::http::{QueryClient, QueryConfig};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let config = QueryConfig::new(
///     Duration::from_secs(30),  // stale_time
///     Duration::from_secs(300), // cache_time
/// );
///
/// let client = Arc::new(QueryClient::with_config(config));
/// ```
#[derive(Debug, Clone)]
pub struct QueryClient {
    cache: Arc<DashMap<CacheKey, ErasedEntry>>,
    in_flight: Arc<DashMap<CacheKey, Pending>>,
    next_fetch: Arc<AtomicU64>,
    invalidation_tx: broadcast::Sender<String>,
    config: QueryConfig,
}

impl QueryClient {
    /// Creates a new query client with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(QueryConfig::default())
    }

    /// Creates a new query client with the given configuration.
    #[must_use]
    pub fn with_config(config: QueryConfig) -> Self {
        let (invalidation_tx, _) = broadcast::channel(100);
        Self {
            cache: Arc::new(DashMap::new()),
            in_flight: Arc::new(DashMap::new()),
            next_fetch: Arc::new(AtomicU64::new(0)),
            invalidation_tx,
            config,
        }
    }

    /// Invalidates the cache for the given key, triggering refetch in active queries.
    ///
    /// This returns a `Command` that performs the invalidation as a side effect
    /// and produces no messages.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// fn update(&mut self, msg: Message) -> Command<Message> {
    ///     match msg {
    ///         Message::Refresh => self.query_client.invalidate(&"todos"),
    ///     }
    /// }
    /// ```
    pub fn invalidate<Msg>(&self, key: &impl ToString) -> Command<Msg>
    where
        Msg: Send + 'static,
    {
        let client = self.clone();
        let key = key.to_string();

        Command {
            stream: Some(
                stream::once(async move { client.invalidate_now(&key) })
                    .filter_map(|()| async { None })
                    .boxed(),
            ),
        }
    }

    /// Marks the key's entries stale and notifies active queries.
    fn invalidate_now(&self, key: &str) {
        for mut entry in self.cache.iter_mut() {
            if entry.key().key == key {
                entry.mark_stale();
            }
        }
        debug!(key, "invalidating query");
        // No receivers simply means no active query for any key.
        let _ = self.invalidation_tx.send(key.to_string());
    }

    /// Drops cache entries older than the configured cache time.
    ///
    /// Returns the number of entries removed.
    pub fn collect_garbage(&self) -> usize {
        let cache_time = self.config.cache_time;
        let before = self.cache.len();
        self.cache.retain(|_, entry| !entry.should_gc(cache_time));
        let removed = before.saturating_sub(self.cache.len());
        if removed > 0 {
            debug!(removed, "collected expired query cache entries");
        }
        removed
    }

    /// Returns `true` if a request for `key` is currently in flight.
    #[must_use]
    pub fn is_fetching(&self, key: &str) -> bool {
        self.in_flight.iter().any(|pending| pending.key().key == key)
    }

    /// Gets the query configuration.
    #[must_use]
    pub const fn config(&self) -> &QueryConfig {
        &self.config
    }

    fn subscribe_invalidation(&self) -> broadcast::Receiver<String> {
        self.invalidation_tx.subscribe()
    }

    fn get_cache<T: Clone + 'static>(&self, key: &str) -> Option<CacheEntry<T>> {
        self.cache
            .get(&CacheKey::new::<T>(key))
            .and_then(|entry| entry.downcast::<T>())
    }

    fn set_cache<T: Send + Sync + 'static>(&self, key: String, entry: CacheEntry<T>) {
        self.cache.insert(CacheKey::new::<T>(key), entry.erase());
    }

    fn start_fetch<V>(&self, fetcher: &Arc<dyn Fetcher<Output = V>>) -> (Pending, SharedFetch<V>)
    where
        V: Clone + Send + Sync + 'static,
    {
        let fetch = fetcher.fetch().shared();
        let pending = Pending {
            id: self.next_fetch.fetch_add(1, Ordering::Relaxed),
            fetch: Box::new(fetch.clone()),
        };
        (pending, fetch)
    }

    /// Runs `fetcher` for `key`, joining an identical request already in flight.
    ///
    /// Whoever observes the completed request first removes it from the
    /// in-flight table and stores a successful result in the cache. If every
    /// awaiter is dropped first, the request is abandoned.
    async fn fetch_shared<V>(&self, key: &str, fetcher: &Arc<dyn Fetcher<Output = V>>) -> Result<V, FetchFailure>
    where
        V: Clone + Send + Sync + 'static,
    {
        let slot = CacheKey::new::<V>(key);
        let (id, fetch) = match self.in_flight.entry(slot.clone()) {
            Entry::Occupied(mut occupied) => {
                let joined = occupied.get().fetch.downcast_ref::<SharedFetch<V>>().cloned();
                if let Some(fetch) = joined {
                    debug!(key, "joining in-flight fetch");
                    (occupied.get().id, fetch)
                } else {
                    let (pending, fetch) = self.start_fetch(fetcher);
                    let id = pending.id;
                    occupied.insert(pending);
                    (id, fetch)
                }
            }
            Entry::Vacant(vacant) => {
                debug!(key, "starting fetch");
                let (pending, fetch) = self.start_fetch(fetcher);
                let id = pending.id;
                vacant.insert(pending);
                (id, fetch)
            }
        };

        let mut hold = InFlight {
            table: &self.in_flight,
            slot,
            id,
            fetch,
        };
        let result = (&mut hold.fetch).await;

        if hold.release() {
            if let Ok(data) = &result {
                self.set_cache(key.to_string(), CacheEntry::new(data.clone()));
            }
        }

        result
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

/// A query subscription that monitors and fetches data with caching.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use tears_fetch::fetch::FetchFailure;
/// use tears_fetch::subscription::Subscription;
/// use tears_fetch::subscription::http::{Query, QueryClient, QueryResult};
///
/// enum Message {
///     Count(QueryResult<u32>),
/// }
///
/// let client = Arc::new(QueryClient::new());
/// let query = Subscription::new(Query::from_fn(
///     &"count",
///     || Box::pin(async { Ok::<u32, FetchFailure>(42) }),
///     client,
/// ))
/// .map(Message::Count);
/// ```
pub struct Query<V> {
    key: String,
    fetcher: Arc<dyn Fetcher<Output = V>>,
    client: Arc<QueryClient>,
}

impl<V> Query<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a new query with the given key, fetcher, and client.
    ///
    /// The key and the value type together identify the cache entry; queries
    /// that agree on both share data and in-flight requests. Invalidating a key
    /// affects every value type cached under it.
    pub fn new<F>(key: &impl ToString, fetcher: F, client: Arc<QueryClient>) -> Self
    where
        F: Fetcher<Output = V> + 'static,
    {
        Self::shared(key, Arc::new(fetcher), client)
    }

    /// Creates a query from an already shared fetcher.
    pub fn shared(key: &impl ToString, fetcher: Arc<dyn Fetcher<Output = V>>, client: Arc<QueryClient>) -> Self {
        Self {
            key: key.to_string(),
            fetcher,
            client,
        }
    }

    /// Creates a query from a closure returning a boxed future.
    pub fn from_fn<F>(key: &impl ToString, fetcher: F, client: Arc<QueryClient>) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<V, FetchFailure>> + Send + Sync + 'static,
    {
        Self::new(key, fetcher, client)
    }

    /// The cache key of this query.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Internal state machine for the Query subscription.
enum State {
    Initial,
    Fetching { rx: broadcast::Receiver<String> },
    Watching { rx: broadcast::Receiver<String> },
}

impl<V> SubscriptionSource for Query<V>
where
    V: Clone + Send + Sync + 'static,
{
    type Output = QueryResult<V>;

    fn stream(&self) -> BoxStream<'static, Self::Output> {
        let key = self.key.clone();
        let fetcher = self.fetcher.clone();
        let client = self.client.clone();

        stream::unfold(State::Initial, move |state| {
            let key = key.clone();
            let fetcher = fetcher.clone();
            let client = client.clone();

            async move {
                match state {
                    State::Initial => {
                        // Subscribe before fetching so invalidations during the fetch are seen.
                        let rx = client.subscribe_invalidation();

                        if let Some(mut cached) = client.get_cache::<V>(&key) {
                            let is_stale = cached.check_staleness(client.config().stale_time);
                            debug!(key, is_stale, "query cache hit");
                            let result = QueryResult::success(cached.data, is_stale);
                            if is_stale {
                                Some((result, State::Fetching { rx }))
                            } else {
                                Some((result, State::Watching { rx }))
                            }
                        } else {
                            Some((QueryResult::loading(), State::Fetching { rx }))
                        }
                    }

                    State::Fetching { rx } => {
                        let result = match client.fetch_shared(&key, &fetcher).await {
                            Ok(data) => QueryResult::success(data, false),
                            Err(failure) => QueryResult::error(failure),
                        };
                        Some((result, State::Watching { rx }))
                    }

                    State::Watching { mut rx } => {
                        let revalidate = sleep_or_pending(client.config().refetch_interval);
                        tokio::pin!(revalidate);

                        loop {
                            tokio::select! {
                                received = rx.recv() => match received {
                                    Ok(invalidated) if invalidated == key => {
                                        return Some((QueryResult::loading(), State::Fetching { rx }));
                                    }
                                    Ok(_) => {}
                                    Err(RecvError::Lagged(skipped)) => {
                                        // Our key may have been among the skipped notifications.
                                        debug!(key, skipped, "invalidation receiver lagged");
                                        return Some((QueryResult::loading(), State::Fetching { rx }));
                                    }
                                    Err(RecvError::Closed) => return None,
                                },
                                () = &mut revalidate => {
                                    debug!(key, "revalidating query on interval");
                                    let result = client
                                        .get_cache::<V>(&key)
                                        .map_or_else(QueryResult::loading, |cached| {
                                            QueryResult::success(cached.data, true)
                                        });
                                    return Some((result, State::Fetching { rx }));
                                }
                            }
                        }
                    }
                }
            }
        })
        .boxed()
    }

    fn id(&self) -> SubscriptionId {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        SubscriptionId::of::<Self>(hasher.finish())
    }
}

impl<V> Hash for Query<V> {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.key.hash(hasher);
    }
}

async fn sleep_or_pending(period: Option<Duration>) {
    match period {
        Some(period) => tokio::time::sleep(period).await,
        None => std::future::pending().await,
    }
}
