//! Prelude module for convenient imports.
//!
//! ```
//! use tears_fetch::prelude::*;
//! ```
//!
//! # What's included
//!
//! - [`Application`] - The main application trait
//! - [`Command`] - For performing side effects
//! - [`Action`] - Actions that commands can perform
//! - [`Subscription`] - For handling event sources
//! - [`Runtime`] - The application runtime
//! - [`Fetcher`], [`FetchFailure`], [`ListItem`] - The fetch contract
//! - [`ViewState`] - What a list component renders

pub use crate::application::Application;
pub use crate::command::{Action, Command};
pub use crate::fetch::machine::ViewState;
pub use crate::fetch::{FetchFailure, Fetcher, ListItem};
pub use crate::runtime::Runtime;
pub use crate::subscription::Subscription;
