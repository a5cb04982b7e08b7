//! One-shot side effects returned from `new` and `update`.
//!
//! A fetch is the typical command: it runs once, produces one message with the
//! result, and is done. Long-lived sources belong in
//! [`Subscription`](crate::subscription::Subscription)s instead.

use futures::{
    FutureExt, Stream, StreamExt,
    stream::{self, BoxStream, select_all},
};

/// What a command asks of the runtime.
pub enum Action<Msg> {
    /// Deliver a message to `update`.
    Message(Msg),

    /// Stop the event loop. Pending commands are abandoned and subscriptions cancelled.
    Quit,
}

/// An asynchronous effect producing zero or more [`Action`]s.
///
/// The runtime drives each command on its own task and feeds the actions back
/// into the event loop in the order the command yields them.
///
/// # Examples
///
/// ```
/// use tears_fetch::command::Command;
/// use tears_fetch::fetch::{FetchFailure, ListItem};
///
/// enum Message {
///     Loaded(Result<Vec<ListItem>, FetchFailure>),
/// }
///
/// async fn load() -> Result<Vec<ListItem>, FetchFailure> {
///     Ok(Vec::new())
/// }
///
/// let cmd = Command::perform(load(), Message::Loaded);
/// ```
pub struct Command<Msg: Send + 'static> {
    pub(crate) stream: Option<BoxStream<'static, Action<Msg>>>,
}

impl<Msg: Send + 'static> Command<Msg> {
    /// No effect.
    pub fn none() -> Self {
        Self { stream: None }
    }

    /// Runs `future` and turns its output into a message with `f`.
    ///
    /// ```
    /// use tears_fetch::command::Command;
    ///
    /// enum Message {
    ///     Counted(usize),
    /// }
    ///
    /// let cmd = Command::perform(async { 3 }, Message::Counted);
    /// ```
    pub fn perform<A>(
        future: impl Future<Output = A> + Send + 'static,
        f: impl FnOnce(A) -> Msg + Send + 'static,
    ) -> Self {
        Self::future(future.map(f))
    }

    /// Runs a future whose output already is a message.
    pub fn future(future: impl Future<Output = Msg> + Send + 'static) -> Self {
        Self {
            stream: Some(future.into_stream().map(Action::Message).boxed()),
        }
    }

    /// Delivers `msg` on the next update cycle.
    ///
    /// ```
    /// use tears_fetch::command::Command;
    ///
    /// enum Message {
    ///     Refetch,
    /// }
    ///
    /// let cmd = Command::message(Message::Refetch);
    /// ```
    pub fn message(msg: Msg) -> Self {
        Self::effect(Action::Message(msg))
    }

    /// Performs a single action, typically [`Action::Quit`].
    ///
    /// ```
    /// use tears_fetch::command::{Action, Command};
    ///
    /// let quit: Command<()> = Command::effect(Action::Quit);
    /// ```
    pub fn effect(action: Action<Msg>) -> Self {
        Self {
            stream: Some(stream::once(async move { action }).boxed()),
        }
    }

    /// Runs several commands concurrently.
    ///
    /// Messages from different commands interleave in completion order. Empty
    /// commands are dropped, and a batch of only empty commands is itself empty.
    ///
    /// ```
    /// use tears_fetch::command::Command;
    ///
    /// enum Message {
    ///     Left(u32),
    ///     Right(u32),
    /// }
    ///
    /// let cmd = Command::batch([
    ///     Command::perform(async { 1 }, Message::Left),
    ///     Command::perform(async { 2 }, Message::Right),
    ///     Command::none(),
    /// ]);
    /// ```
    pub fn batch(commands: impl IntoIterator<Item = Command<Msg>>) -> Self {
        let streams: Vec<_> = commands.into_iter().filter_map(|cmd| cmd.stream).collect();

        if streams.is_empty() {
            Self::none()
        } else {
            Self {
                stream: Some(select_all(streams).boxed()),
            }
        }
    }

    /// Delivers every item of `stream` as a message.
    pub fn stream(stream: impl Stream<Item = Msg> + Send + 'static) -> Self {
        Self {
            stream: Some(stream.map(Action::Message).boxed()),
        }
    }

    /// Delivers every item of `stream`, converted with `f`.
    ///
    /// ```
    /// use futures::stream;
    /// use tears_fetch::command::Command;
    ///
    /// enum Message {
    ///     Page(u32),
    /// }
    ///
    /// let cmd = Command::run(stream::iter(1..=3), Message::Page);
    /// ```
    pub fn run<A>(
        stream: impl Stream<Item = A> + Send + 'static,
        f: impl Fn(A) -> Msg + Send + 'static,
    ) -> Self {
        Self::stream(stream.map(f))
    }

    /// Lifts a component's command into its parent's message type.
    ///
    /// [`Action::Quit`] passes through unchanged.
    ///
    /// ```
    /// use tears_fetch::command::Command;
    ///
    /// enum ListMessage {
    ///     Loaded(usize),
    /// }
    ///
    /// enum AppMessage {
    ///     List(ListMessage),
    /// }
    ///
    /// let cmd = Command::future(async { ListMessage::Loaded(3) }).map(AppMessage::List);
    /// ```
    pub fn map<T: Send + 'static>(self, f: impl Fn(Msg) -> T + Send + 'static) -> Command<T> {
        Command {
            stream: self.stream.map(|stream| {
                stream
                    .map(move |action| match action {
                        Action::Message(msg) => Action::Message(f(msg)),
                        Action::Quit => Action::Quit,
                    })
                    .boxed()
            }),
        }
    }

    /// Returns `true` if this command has no effect to run.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.stream.is_none()
    }
}
