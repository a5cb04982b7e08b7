use ratatui::Frame;

use crate::{command::Command, subscription::Subscription};

/// The main trait that defines a TUI application following the Elm Architecture.
///
/// An application owns its components, routes their messages through
/// [`update`](Application::update), and declares the subscriptions it currently
/// wants to listen to. Components that fetch remote data keep their fetch state
/// inside the application model; the runtime only delivers messages.
///
/// # Type Parameters
///
/// * `Message` - The type of messages that your application handles. Must be `Send + 'static`.
/// * `Flags` - Configuration data passed at initialization. Must be `Clone + Send`.
///
/// # Example
///
/// ```
/// use ratatui::Frame;
/// use tears_fetch::{application::Application, command::Command, subscription::Subscription};
///
/// #[derive(Debug)]
/// enum Message {
///     Loaded(Vec<String>),
///     Failed(String),
/// }
///
/// enum Model {
///     Loading,
///     Ready(Vec<String>),
///     Broken(String),
/// }
///
/// impl Application for Model {
///     type Message = Message;
///     type Flags = ();
///
///     fn new(_flags: ()) -> (Self, Command<Message>) {
///         let cmd = Command::perform(
///             async { Ok::<_, String>(vec!["write docs".to_string()]) },
///             |result| match result {
///                 Ok(items) => Message::Loaded(items),
///                 Err(e) => Message::Failed(e),
///             },
///         );
///         (Model::Loading, cmd)
///     }
///
///     fn update(&mut self, msg: Message) -> Command<Message> {
///         *self = match msg {
///             Message::Loaded(items) => Model::Ready(items),
///             Message::Failed(e) => Model::Broken(e),
///         };
///         Command::none()
///     }
///
///     fn view(&self, _frame: &mut Frame<'_>) {
///         // Render loading, error or the list here
///     }
///
///     fn subscriptions(&self) -> Vec<Subscription<Message>> {
///         vec![]
///     }
/// }
/// ```
pub trait Application: Sized {
    /// The type of messages your application processes.
    ///
    /// Messages are produced by user input, subscriptions, or commands.
    type Message: Send + 'static;

    /// Configuration data for initializing your application.
    ///
    /// Use `()` if no configuration is needed.
    type Flags: Clone + Send;

    /// Initialize the application with the given flags.
    ///
    /// Called once when the runtime is created. The returned command runs as soon
    /// as the runtime starts; this is where components perform their activation fetch.
    fn new(flags: Self::Flags) -> (Self, Command<Self::Message>);

    /// Process a message and update the application state.
    ///
    /// All state changes happen here. The returned command is executed by the
    /// runtime and its messages are fed back into `update`.
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Render the application's user interface.
    ///
    /// This method should be pure: it only reads from `self`.
    fn view(&self, frame: &mut Frame<'_>);

    /// Define subscriptions for external event sources.
    ///
    /// Called after initialization and after every update. The runtime compares
    /// the returned subscriptions with the running ones by
    /// [`SubscriptionId`](crate::subscription::SubscriptionId): new ids are
    /// started, ids that are no longer returned are cancelled, and unchanged ids
    /// keep running untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tears_fetch::{application::Application, command::Command, subscription::Subscription};
    /// # use ratatui::Frame;
    /// # struct MyApp { auto_refresh: bool }
    /// # enum Message { Tick, Input }
    /// # impl Application for MyApp {
    /// #     type Message = Message;
    /// #     type Flags = ();
    /// #     fn new(_: ()) -> (Self, Command<Message>) { (MyApp { auto_refresh: false }, Command::none()) }
    /// #     fn update(&mut self, msg: Message) -> Command<Message> { Command::none() }
    /// #     fn view(&self, frame: &mut Frame<'_>) {}
    /// fn subscriptions(&self) -> Vec<Subscription<Message>> {
    ///     use tears_fetch::subscription::terminal::TerminalEvents;
    ///     use tears_fetch::subscription::time::Timer;
    ///
    ///     let mut subs = vec![Subscription::new(TerminalEvents::new()).map(|_| Message::Input)];
    ///     if self.auto_refresh {
    ///         subs.push(Subscription::new(Timer::new(5_000)).map(|_| Message::Tick));
    ///     }
    ///     subs
    /// }
    /// # }
    /// ```
    fn subscriptions(&self) -> Vec<Subscription<Self::Message>>;
}
