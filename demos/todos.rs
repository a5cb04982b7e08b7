//! Two todo lists side by side, fetched from `JSONPlaceholder`.
//!
//! The left list owns its fetch and shows `Loading...` on every refetch. The right
//! list reads through the query cache, so it keeps showing stale rows while it
//! revalidates.
//!
//! Keys:
//! - `r`: refetch both lists
//! - `d`: toggle whether the lists are active
//! - `a`: toggle auto refresh every 30 seconds
//! - `q`: quit
//!
//! Run with: `cargo run --example todos`
//!
//! Set `TEARS_FETCH_LOG=/tmp/todos.log` to write a trace of fetches to a file.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tears_fetch::component::{CachedTodoList, TodoList, cached_list, todo_list};
use tears_fetch::fetch::{FetchConfig, HttpFetcher, SharedListFetcher};
use tears_fetch::prelude::*;
use tears_fetch::subscription::http::{QueryClient, QueryConfig};
use tears_fetch::subscription::terminal::TerminalEvents;
use tears_fetch::subscription::time::Timer;

const AUTO_REFRESH: Duration = Duration::from_secs(30);

#[derive(Debug)]
enum Message {
    Terminal(Event),
    TerminalError(io::Error),
    Manual(todo_list::Message),
    Cached(cached_list::Message),
    AutoRefresh,
}

struct App {
    manual: TodoList,
    cached: CachedTodoList,
    client: Arc<QueryClient>,
    auto_refresh: bool,
    status: String,
}

impl App {
    fn refetch(&mut self) -> Command<Message> {
        Command::batch([
            self.manual.update(todo_list::Message::Refetch).map(Message::Manual),
            self.cached.update(cached_list::Message::Refetch).map(Message::Cached),
        ])
    }

    fn toggle_active(&mut self) -> Command<Message> {
        if self.manual.is_active() {
            self.status = "Lists deactivated".to_string();
            Command::batch([
                self.manual.update(todo_list::Message::Deactivate).map(Message::Manual),
                self.cached.update(cached_list::Message::Deactivate).map(Message::Cached),
            ])
        } else {
            self.status = "Lists activated".to_string();
            Command::batch([
                self.manual.update(todo_list::Message::Activate).map(Message::Manual),
                self.cached.update(cached_list::Message::Activate).map(Message::Cached),
            ])
        }
    }
}

impl Application for App {
    type Message = Message;
    type Flags = FetchConfig;

    fn new(config: FetchConfig) -> (Self, Command<Message>) {
        let fetcher: SharedListFetcher = Arc::new(HttpFetcher::new(config));
        let client = Arc::new(QueryClient::with_config(QueryConfig::new(
            Duration::from_secs(10),
            Duration::from_secs(300),
        )));

        let mut app = Self {
            manual: TodoList::new("Todos", fetcher.clone()),
            cached: CachedTodoList::new("Cached todos", "todos", fetcher, client.clone()),
            client,
            auto_refresh: false,
            status: String::new(),
        };
        let cmd = app.toggle_active();
        (app, cmd)
    }

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') => Command::effect(Action::Quit),
                KeyCode::Char('r') => {
                    self.status = "Refetching".to_string();
                    self.refetch()
                }
                KeyCode::Char('d') => self.toggle_active(),
                KeyCode::Char('a') => {
                    self.auto_refresh = !self.auto_refresh;
                    self.status = format!(
                        "Auto refresh {}",
                        if self.auto_refresh { "on" } else { "off" }
                    );
                    Command::none()
                }
                _ => Command::none(),
            },
            Message::Terminal(_) => Command::none(),
            Message::TerminalError(e) => {
                self.status = format!("Terminal error: {e}");
                Command::effect(Action::Quit)
            }
            Message::Manual(msg) => self.manual.update(msg).map(Message::Manual),
            Message::Cached(msg) => self.cached.update(msg).map(Message::Cached),
            Message::AutoRefresh => {
                self.client.collect_garbage();
                self.refetch()
            }
        }
    }

    fn view(&self, frame: &mut Frame<'_>) {
        let [main, help] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(3)]).areas(frame.area());
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(main);

        self.manual.render(frame, left);
        self.cached.render(frame, right);

        let auto = if self.auto_refresh { "on" } else { "off" };
        let text = format!(
            "r: refetch  d: toggle active  a: auto refresh ({auto})  q: quit  {}",
            self.status
        );
        frame.render_widget(
            Paragraph::new(text).block(Block::default().borders(Borders::ALL)),
            help,
        );
    }

    fn subscriptions(&self) -> Vec<Subscription<Message>> {
        let mut subs = vec![Subscription::new(TerminalEvents::new()).map(|result| match result {
            Ok(event) => Message::Terminal(event),
            Err(e) => Message::TerminalError(e),
        })];

        if self.auto_refresh {
            subs.push(Subscription::new(Timer::every(AUTO_REFRESH)).map(|_| Message::AutoRefresh));
        }

        subs.extend(
            self.cached
                .subscriptions()
                .into_iter()
                .map(|sub| sub.map(Message::Cached)),
        );
        subs
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tears_fetch::logging::init_tracing();

    let config = FetchConfig::default().with_limit(10);

    let mut terminal = ratatui::init();
    let result = Runtime::<App>::new(config).run(&mut terminal, 30).await;
    ratatui::restore();

    result
}
