//! Subscriptions: long-running sources of messages.
//!
//! A [`Subscription`] wraps a [`SubscriptionSource`] together with its
//! [`SubscriptionId`]. Applications declare the subscriptions they want from
//! [`Application::subscriptions`](crate::application::Application::subscriptions);
//! the runtime keeps exactly that set running.
//!
//! The id is derived from the source's *values* (its type plus a hash of its
//! parameters), so a subscription is restarted only when one of the values it
//! watches changes. Identical declarations across updates keep the existing task.
//! When an id disappears, the task is cancelled through its
//! [`CancellationToken`] and everything its stream owns (timers, sockets,
//! broadcast receivers) is released.

pub mod http;
pub mod mock;
pub mod terminal;
pub mod time;

use std::any::TypeId;
use std::collections::{HashMap, HashSet};

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::command::Action;

/// Identity of a subscription: the source type plus a hash of its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    type_id: TypeId,
    hash: u64,
}

impl SubscriptionId {
    /// Creates an id for source type `T` with the given parameter hash.
    #[must_use]
    pub fn of<T: 'static>(hash: u64) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            hash,
        }
    }
}

/// A source of messages that runs until cancelled or exhausted.
pub trait SubscriptionSource: Send {
    /// The type of items the source produces.
    type Output;

    /// Creates the stream of items. Called once each time the subscription starts.
    fn stream(&self) -> BoxStream<'static, Self::Output>;

    /// Returns the identity used to decide whether a running subscription is kept.
    fn id(&self) -> SubscriptionId;
}

/// A declared subscription, ready to be started by the runtime.
///
/// # Example
///
/// ```rust
/// use tears_fetch::subscription::{Subscription, time::Timer};
///
/// enum Message {
///     Refresh,
/// }
///
/// let sub = Subscription::new(Timer::new(30_000)).map(|_| Message::Refresh);
/// ```
pub struct Subscription<Msg> {
    pub(crate) id: SubscriptionId,
    pub(crate) spawn: Box<dyn FnOnce() -> BoxStream<'static, Msg> + Send>,
}

impl<Msg: Send + 'static> Subscription<Msg> {
    /// Creates a subscription from a source.
    pub fn new<S>(source: S) -> Self
    where
        S: SubscriptionSource<Output = Msg> + 'static,
    {
        Self {
            id: source.id(),
            spawn: Box::new(move || source.stream()),
        }
    }

    /// Transforms the items of this subscription into another message type.
    ///
    /// The id is kept, so mapping does not change whether the subscription restarts.
    pub fn map<T, F>(self, f: F) -> Subscription<T>
    where
        T: Send + 'static,
        F: Fn(Msg) -> T + Send + 'static,
    {
        let spawn = self.spawn;
        Subscription {
            id: self.id,
            spawn: Box::new(move || spawn().map(f).boxed()),
        }
    }

    /// Returns the identity of this subscription.
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }
}

/// Handle for a running subscription task.
struct Handle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl Handle {
    /// Requests cancellation without waiting for the task.
    fn cancel(&self) {
        self.token.cancel();
    }
}

/// Keeps the running subscriptions in sync with the declared ones.
pub(crate) struct SubscriptionManager<Msg> {
    running: HashMap<SubscriptionId, Handle>,
    tx: mpsc::UnboundedSender<Action<Msg>>,
}

impl<Msg: Send + 'static> SubscriptionManager<Msg> {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Action<Msg>>) -> Self {
        Self {
            running: HashMap::new(),
            tx,
        }
    }

    /// Starts newly declared subscriptions and cancels the ones no longer declared.
    ///
    /// Removed subscriptions are cancelled before new ones start. Duplicate ids
    /// in one declaration start a single task.
    pub(crate) fn update(&mut self, subscriptions: impl IntoIterator<Item = Subscription<Msg>>) {
        let subscriptions: Vec<_> = subscriptions.into_iter().collect();
        let declared: HashSet<_> = subscriptions.iter().map(|sub| sub.id).collect();

        self.running.retain(|id, handle| {
            if declared.contains(id) {
                true
            } else {
                debug!(?id, "cancelling subscription");
                handle.cancel();
                false
            }
        });

        for sub in subscriptions {
            if self.running.contains_key(&sub.id) {
                continue;
            }
            debug!(id = ?sub.id, "starting subscription");
            let id = sub.id;
            let handle = spawn(sub, self.tx.clone());
            self.running.insert(id, handle);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.running.len()
    }

    /// Cancels every subscription and waits for the tasks to finish.
    pub(crate) async fn shutdown(&mut self) {
        for (id, handle) in self.running.drain() {
            debug!(?id, "shutting down subscription");
            handle.cancel();
            let _ = handle.join.await;
        }
    }
}

fn spawn<Msg: Send + 'static>(sub: Subscription<Msg>, tx: mpsc::UnboundedSender<Action<Msg>>) -> Handle {
    let token = CancellationToken::new();
    let cancelled = token.clone();

    let join = tokio::spawn(async move {
        let mut stream = (sub.spawn)();
        loop {
            tokio::select! {
                () = cancelled.cancelled() => break,
                item = stream.next() => match item {
                    Some(msg) => {
                        if tx.send(Action::Message(msg)).is_err() {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
    });

    Handle { token, join }
}
