//! A list component backed by the query cache.
//!
//! The component keeps no fetch logic of its own. While active it declares a
//! [`Query`] for its key and stores whatever [`QueryResult`] arrives; caching,
//! revalidation and deduplication are handled by the shared [`QueryClient`].

use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::Command;
use crate::fetch::{ListItem, SharedListFetcher, ViewState};
use crate::subscription::Subscription;
use crate::subscription::http::{Query, QueryClient, QueryResult, QueryState};

use super::render_view;

#[derive(Debug)]
pub enum Message {
    Activate,
    Deactivate,
    /// Invalidate the key; every active query for it refetches.
    Refetch,
    Query(QueryResult<Vec<ListItem>>),
}

pub struct CachedTodoList {
    title: String,
    key: String,
    fetcher: SharedListFetcher,
    client: Arc<QueryClient>,
    state: QueryState<Vec<ListItem>>,
    active: bool,
}

impl CachedTodoList {
    /// Creates an inactive component reading `key` through `client`.
    pub fn new(
        title: impl Into<String>,
        key: impl Into<String>,
        fetcher: SharedListFetcher,
        client: Arc<QueryClient>,
    ) -> Self {
        Self {
            title: title.into(),
            key: key.into(),
            fetcher,
            client,
            state: QueryState::Loading,
            active: false,
        }
    }

    pub fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::Activate => {
                self.active = true;
                Command::none()
            }
            Message::Deactivate => {
                self.active = false;
                self.state = QueryState::Loading;
                Command::none()
            }
            Message::Refetch if self.active => self.client.invalidate(&self.key),
            Message::Refetch => Command::none(),
            Message::Query(result) => {
                // A result can still be queued when the subscription was cancelled.
                if self.active {
                    self.state = result.state;
                }
                Command::none()
            }
        }
    }

    /// The query subscription, declared only while the component is active.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<Subscription<Message>> {
        if !self.active {
            return Vec::new();
        }
        let query = Query::shared(&self.key, self.fetcher.clone(), self.client.clone());
        vec![Subscription::new(query).map(Message::Query)]
    }

    #[must_use]
    pub fn view_state(&self) -> ViewState<&[ListItem]> {
        self.state.view().map(Vec::as_slice)
    }

    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self.state, QueryState::Success { is_stale: true, .. })
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let title = if !self.active {
            format!("{} (inactive)", self.title)
        } else if self.is_stale() {
            format!("{} (stale, refetching...)", self.title)
        } else {
            self.title.clone()
        };
        render_view(frame, area, &title, self.view_state());
    }
}
