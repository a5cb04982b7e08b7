use std::marker::PhantomData;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{FetchConfig, FetchFailure, Fetcher, ListItem};

/// Fetches a JSON collection with a `GET` request.
///
/// Non-success statuses are failures; the body is only decoded for 2xx responses.
///
/// # Example
///
/// ```rust,no_run
/// use tears_fetch::fetch::{FetchConfig, Fetcher, HttpFetcher};
///
/// # async fn demo() {
/// let fetcher = HttpFetcher::new(FetchConfig::default().with_limit(10));
/// match fetcher.fetch().await {
///     Ok(items) => println!("{} todos", items.len()),
///     Err(failure) => eprintln!("{failure}"),
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct HttpFetcher<T = Vec<ListItem>> {
    client: reqwest::Client,
    config: Arc<FetchConfig>,
    _output: PhantomData<fn() -> T>,
}

impl HttpFetcher {
    /// Creates a fetcher for a list of [`ListItem`] with a fresh HTTP client.
    #[must_use]
    pub fn new(config: FetchConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }
}

impl<T> HttpFetcher<T> {
    /// Creates a fetcher sharing an existing client (and its connection pool).
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: FetchConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
            _output: PhantomData,
        }
    }

    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

impl<T> Clone for HttpFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            config: self.config.clone(),
            _output: PhantomData,
        }
    }
}

impl<T> Fetcher for HttpFetcher<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    fn fetch(&self) -> BoxFuture<'static, Result<T, FetchFailure>> {
        let client = self.client.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let mut request = client.get(&config.endpoint).timeout(config.timeout);
            if let Some(limit) = config.limit {
                request = request.query(&[("_limit", limit)]);
            }

            debug!(endpoint = %config.endpoint, "fetching collection");
            let result = async {
                let response = request.send().await?.error_for_status()?;
                response.json::<T>().await
            }
            .await
            .map_err(FetchFailure::from);

            if let Err(failure) = &result {
                warn!(endpoint = %config.endpoint, status = ?failure.status(), %failure, "fetch failed");
            }
            result
        })
    }
}
