//! # tears-fetch - remote lists for Elm Architecture TUIs
//!
//! tears-fetch shows two ways of fetching a remote collection inside a component
//! of an Elm Architecture (TEA) terminal application built on
//! [ratatui](https://ratatui.rs/):
//!
//! 1. **Manual**: an explicit fetch [`Command`](command::Command) plus local state kept in a
//!    [`FetchMachine`](fetch::machine::FetchMachine). Every activation performs exactly one
//!    fetch and the machine moves from `Loading` to `Success` or `Error`.
//! 2. **Declarative**: a [`Query`](subscription::http::Query) subscription backed by a
//!    [`QueryClient`](subscription::http::QueryClient) that caches results, revalidates stale
//!    data in the background, refetches on invalidation or on an interval, and shares
//!    in-flight requests for the same key.
//!
//! ## Core Components
//!
//! - [`Application`](application::Application): The main trait that defines your application
//! - [`Runtime`](runtime::Runtime): Manages the application lifecycle and event loop
//! - [`Command`](command::Command): Represents asynchronous side effects
//! - [`Subscription`](subscription::Subscription): Represents ongoing event sources
//! - [`Fetcher`](fetch::Fetcher): One outbound request for a collection
//! - [`TodoList`](component::TodoList) and [`CachedTodoList`](component::CachedTodoList):
//!   the two list components
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ratatui::Frame;
//! use tears_fetch::component::todo_list::{self, TodoList};
//! use tears_fetch::fetch::{FetchConfig, HttpFetcher};
//! use tears_fetch::prelude::*;
//!
//! struct App {
//!     todos: TodoList,
//! }
//!
//! impl Application for App {
//!     type Message = todo_list::Message;
//!     type Flags = ();
//!
//!     fn new(_flags: ()) -> (Self, Command<Self::Message>) {
//!         let fetcher = Arc::new(HttpFetcher::new(FetchConfig::default()));
//!         let mut todos = TodoList::new("Todos", fetcher);
//!         let cmd = todos.update(todo_list::Message::Activate);
//!         (App { todos }, cmd)
//!     }
//!
//!     fn update(&mut self, msg: Self::Message) -> Command<Self::Message> {
//!         self.todos.update(msg)
//!     }
//!
//!     fn view(&self, frame: &mut Frame<'_>) {
//!         self.todos.render(frame, frame.area());
//!     }
//!
//!     fn subscriptions(&self) -> Vec<Subscription<Self::Message>> {
//!         vec![]
//!     }
//! }
//! ```

pub mod application;
pub mod command;
pub mod component;
pub mod fetch;
pub mod logging;
pub mod prelude;
pub mod runtime;
pub mod subscription;

pub use command::Command;
pub use futures::stream::BoxStream;
