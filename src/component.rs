//! List components and their shared renderer.
//!
//! Both components render a fetched list of [`ListItem`]s in one of three states:
//! loading, error, or the list itself. They differ in where the fetch state lives:
//!
//! - [`TodoList`] owns a [`FetchMachine`](crate::fetch::FetchMachine) and issues the
//!   fetch command itself on every activation or refetch.
//! - [`CachedTodoList`] declares a [`Query`](crate::subscription::http::Query) while
//!   active and renders whatever the shared [`QueryClient`](crate::subscription::http::QueryClient)
//!   reports.

pub mod cached_list;
pub mod todo_list;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, List, ListItem as ListRow, Paragraph, Wrap};

use crate::fetch::{ListItem, ViewState};

pub use cached_list::CachedTodoList;
pub use todo_list::TodoList;

/// One rendered line of a fetched list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// The item's id, used as the row key.
    pub key: u64,
    pub text: String,
    pub completed: bool,
}

/// Maps items to rows, one per item, in the order received.
#[must_use]
pub fn rows(items: &[ListItem]) -> Vec<Row> {
    items
        .iter()
        .map(|item| Row {
            key: item.id,
            text: format!("[{}] {}", if item.completed { "✓" } else { " " }, item.title),
            completed: item.completed,
        })
        .collect()
}

/// Renders one of the three list states into `area`.
pub fn render_view(frame: &mut Frame<'_>, area: Rect, title: &str, state: ViewState<&[ListItem]>) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());

    match state {
        ViewState::Loading => {
            frame.render_widget(Paragraph::new("Loading...").block(block), area);
        }
        ViewState::Error(failure) => {
            let text = match failure.status() {
                Some(status) => format!("Error ({status}): {}", failure.message()),
                None => format!("Error: {}", failure.message()),
            };
            let error = Paragraph::new(text)
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(error, area);
        }
        ViewState::Success(items) => {
            let list: Vec<ListRow> = rows(items)
                .into_iter()
                .map(|row| {
                    let style = if row.completed {
                        Style::default().fg(Color::Green)
                    } else {
                        Style::default()
                    };
                    ListRow::new(row.text).style(style)
                })
                .collect();
            frame.render_widget(List::new(list).block(block), area);
        }
    }
}
