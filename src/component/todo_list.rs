//! A list component that manages its own fetch.
//!
//! Activation puts the component in `Loading` and returns the command that
//! invokes the fetcher once. The result comes back as [`Message::Fetched`] and
//! is applied only if it still belongs to the current attempt. Nothing is cached:
//! every activation and every refetch performs a full request.

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::Command;
use crate::fetch::machine::fetch_command;
use crate::fetch::{FetchMachine, ListItem, Resolved, SharedListFetcher, ViewState};

use super::render_view;

#[derive(Debug)]
pub enum Message {
    /// Start participating and fetch.
    Activate,
    /// Stop participating; in-flight results are ignored.
    Deactivate,
    /// Fetch again, discarding the current outcome.
    Refetch,
    /// A fetch attempt finished.
    Fetched(Resolved<Vec<ListItem>>),
}

pub struct TodoList {
    title: String,
    fetcher: SharedListFetcher,
    machine: FetchMachine<Vec<ListItem>>,
}

impl TodoList {
    /// Creates an inactive component. Send [`Message::Activate`] to load it.
    pub fn new(title: impl Into<String>, fetcher: SharedListFetcher) -> Self {
        Self {
            title: title.into(),
            fetcher,
            machine: FetchMachine::new(),
        }
    }

    pub fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::Activate => {
                let attempt = self.machine.activate();
                fetch_command(&*self.fetcher, attempt).map(Message::Fetched)
            }
            Message::Deactivate => {
                self.machine.deactivate();
                Command::none()
            }
            Message::Refetch => match self.machine.refetch() {
                Some(attempt) => fetch_command(&*self.fetcher, attempt).map(Message::Fetched),
                None => Command::none(),
            },
            Message::Fetched(resolved) => {
                self.machine.apply(resolved);
                Command::none()
            }
        }
    }

    #[must_use]
    pub fn view_state(&self) -> ViewState<&[ListItem]> {
        self.machine.view().map(Vec::as_slice)
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.machine.is_active()
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let title = if self.is_active() {
            self.title.clone()
        } else {
            format!("{} (inactive)", self.title)
        };
        render_view(frame, area, &title, self.view_state());
    }
}
