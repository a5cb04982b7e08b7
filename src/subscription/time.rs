//! Timer subscription for periodic events.
//!
//! A [`Timer`] is the usual way to refresh a list on a schedule: declare it while
//! auto refresh is enabled and stop declaring it to release the underlying
//! interval.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Duration;

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::time::MissedTickBehavior;
use tokio::time::interval;
use tokio_stream::wrappers::IntervalStream;

use super::{SubscriptionId, SubscriptionSource};

/// Messages produced by the [`Timer`] subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// A timer tick has occurred.
    Tick,
}

/// A timer subscription that emits tick messages at regular intervals.
///
/// Missed ticks are skipped rather than replayed, and the first tick arrives
/// after one full interval.
///
/// # Example
///
/// ```rust
/// use tears_fetch::subscription::{Subscription, time::Timer};
///
/// enum AppMessage {
///     Refetch,
/// }
///
/// // Refetch every 30 seconds
/// let sub = Subscription::new(Timer::new(30_000)).map(|_| AppMessage::Refetch);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timer {
    interval_ms: u64,
}

impl Timer {
    /// Create a new timer with the specified interval in milliseconds.
    #[must_use]
    pub const fn new(interval_ms: u64) -> Self {
        Self { interval_ms }
    }

    /// Create a new timer from a [`Duration`], truncated to whole milliseconds.
    #[must_use]
    pub fn every(period: Duration) -> Self {
        Self::new(u64::try_from(period.as_millis()).unwrap_or(u64::MAX))
    }
}

impl SubscriptionSource for Timer {
    type Output = Message;

    fn stream(&self) -> BoxStream<'static, Message> {
        let mut interval = interval(Duration::from_millis(self.interval_ms.max(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        IntervalStream::new(interval)
            .skip(1) // the first tick completes immediately
            .map(|_| Message::Tick)
            .boxed()
    }

    fn id(&self) -> SubscriptionId {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        SubscriptionId::of::<Self>(hasher.finish())
    }
}
