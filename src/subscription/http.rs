//! HTTP queries with caching.
//!
//! This module provides subscription-based queries similar to SWR or TanStack
//! Query. A component declares a [`Query`] while it is active; the shared
//! [`QueryClient`] owns the cache and decides whether the fetcher actually runs.
//!
//! # Features
//!
//! - **Cache hits**: fresh cached data is emitted without a request
//! - **Background revalidation**: stale data is shown while a refetch runs
//! - **Invalidation**: [`QueryClient::invalidate`] refetches every active query for a key
//! - **Interval refetch**: [`QueryConfig::refetch_interval`]
//! - **Deduplication**: concurrent fetches for one key share a single request
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tears_fetch::fetch::{FetchConfig, HttpFetcher, ListItem};
//! use tears_fetch::prelude::*;
//! use tears_fetch::subscription::http::{Query, QueryClient, QueryResult};
//!
//! enum Message {
//!     Todos(QueryResult<Vec<ListItem>>),
//! }
//!
//! fn todos(client: Arc<QueryClient>) -> Subscription<Message> {
//!     let fetcher = HttpFetcher::new(FetchConfig::default().with_limit(10));
//!     Subscription::new(Query::new(&"todos", fetcher, client)).map(Message::Todos)
//! }
//! ```

mod cache;
mod config;
pub mod query;

pub use config::QueryConfig;
pub use query::{Query, QueryClient, QueryResult, QueryState};
