//! Terminal input subscription.

use std::io;

use crossterm::event::{Event, EventStream};
use futures::{StreamExt, stream::BoxStream};

use super::{SubscriptionId, SubscriptionSource};

/// Keyboard, mouse and resize events from crossterm's [`EventStream`].
///
/// Read errors are forwarded as `Err` items; the stream ends after the first error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerminalEvents;

impl TerminalEvents {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SubscriptionSource for TerminalEvents {
    type Output = Result<Event, io::Error>;

    fn stream(&self) -> BoxStream<'static, Self::Output> {
        EventStream::new()
            .scan(false, |failed, item| {
                if *failed {
                    return futures::future::ready(None);
                }
                *failed = item.is_err();
                futures::future::ready(Some(item))
            })
            .boxed()
    }

    fn id(&self) -> SubscriptionId {
        // There is only one terminal.
        SubscriptionId::of::<Self>(0)
    }
}
