//! Mock subscription source for testing.
//!
//! [`MockSource`] emits values on demand, so applications and components can be
//! driven deterministically without real I/O or time dependencies.
//!
//! ```no_run
//! use tears_fetch::prelude::*;
//! use tears_fetch::subscription::mock::MockSource;
//! # use ratatui::Frame;
//!
//! struct App {
//!     refreshes: u32,
//!     refresh: MockSource<()>,
//! }
//!
//! impl Application for App {
//!     type Message = ();
//!     type Flags = MockSource<()>;
//!
//!     fn new(refresh: MockSource<()>) -> (Self, Command<()>) {
//!         (Self { refreshes: 0, refresh }, Command::none())
//!     }
//!
//!     fn update(&mut self, (): ()) -> Command<()> {
//!         self.refreshes += 1;
//!         Command::none()
//!     }
//!
//!     fn view(&self, _frame: &mut Frame<'_>) {}
//!
//!     fn subscriptions(&self) -> Vec<Subscription<()>> {
//!         vec![Subscription::new(self.refresh.clone())]
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::BoxStream;
use crate::subscription::{SubscriptionId, SubscriptionSource};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// A mock subscription source that emits values on demand.
///
/// Clones share the same channel and the same id, so a clone declared from
/// `subscriptions()` is the same subscription as the one the test emits into.
#[derive(Debug, Clone)]
pub struct MockSource<T: Clone> {
    sender: broadcast::Sender<T>,
    id: SubscriptionId,
}

impl<T: Clone + 'static> MockSource<T> {
    /// Creates a new mock source buffering up to `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self {
            sender: tx,
            id: SubscriptionId::of::<Self>(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
        }
    }

    /// Creates a new mock source with default capacity (100).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Emits a value to every running stream of this source.
    ///
    /// # Errors
    ///
    /// Returns an error if no stream is currently running.
    pub fn emit(&self, value: T) -> Result<usize, broadcast::error::SendError<T>> {
        self.sender.send(value)
    }

    /// Returns the number of running streams.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T: Clone + 'static> Default for MockSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> SubscriptionSource for MockSource<T> {
    type Output = T;

    fn stream(&self) -> BoxStream<'static, Self::Output> {
        BroadcastStream::new(self.sender.subscribe())
            .filter_map(|result| async move { result.ok() })
            .boxed()
    }

    fn id(&self) -> SubscriptionId {
        self.id
    }
}
