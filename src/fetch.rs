//! The fetch contract: one outbound request for a collection.
//!
//! A [`Fetcher`] performs exactly one request per call and reports either the
//! decoded collection or a [`FetchFailure`]. Transport errors, non-success
//! statuses and malformed payloads all collapse into that single failure type;
//! callers only get a message and, when one was received, the status code.
//!
//! The [`machine`] module turns fetch results into the `Loading` / `Success` /
//! `Error` view of a list component.

pub mod config;
pub mod http;
pub mod machine;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::FetchConfig;
pub use http::HttpFetcher;
pub use machine::{AttemptId, FetchMachine, FetchOutcome, Resolved, ViewState};

/// One entry of a fetched list.
///
/// `id` is only used as the row key; the rest is displayed as is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(rename = "userId")]
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

/// Why a fetch did not produce data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FetchFailure {
    message: String,
    status: Option<u16>,
}

impl FetchFailure {
    /// Creates a failure without a status code. An empty message is replaced.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "fetch failed".to_string()
        } else {
            message
        };
        Self {
            message,
            status: None,
        }
    }

    /// Creates a failure carrying the response status.
    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::new(message)
        }
    }

    /// Human readable description; never empty.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Status code of the response, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_decode() {
            format!("malformed payload: {err}")
        } else if err.is_timeout() {
            format!("request timed out: {err}")
        } else {
            err.to_string()
        };
        match err.status() {
            Some(status) => Self::with_status(message, status.as_u16()),
            None => Self::new(message),
        }
    }
}

/// Issues one request for a resource and returns the decoded result.
///
/// Closures returning a boxed future are fetchers too:
///
/// ```
/// use tears_fetch::fetch::{FetchFailure, Fetcher, ListItem};
///
/// let fetcher = || -> futures::future::BoxFuture<'static, Result<Vec<ListItem>, FetchFailure>> {
///     Box::pin(async { Ok(Vec::new()) })
/// };
/// let _future = fetcher.fetch();
/// ```
pub trait Fetcher: Send + Sync {
    /// The decoded resource.
    type Output: Send + 'static;

    /// Starts one request. The returned future owns everything it needs.
    fn fetch(&self) -> BoxFuture<'static, Result<Self::Output, FetchFailure>>;
}

impl<F, T> Fetcher for F
where
    F: Fn() -> BoxFuture<'static, Result<T, FetchFailure>> + Send + Sync,
    T: Send + 'static,
{
    type Output = T;

    fn fetch(&self) -> BoxFuture<'static, Result<T, FetchFailure>> {
        self()
    }
}

/// A shareable fetcher for lists of [`ListItem`].
pub type SharedListFetcher = std::sync::Arc<dyn Fetcher<Output = Vec<ListItem>>>;
