#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use std::sync::Arc;

use common::{MockTodoServer, test_terminal};
use futures::future::BoxFuture;
use ratatui::Frame;
use tears_fetch::component::{TodoList, todo_list};
use tears_fetch::fetch::{FetchConfig, HttpFetcher, SharedListFetcher};
use tears_fetch::prelude::*;
use tokio::time::{Duration, Instant, sleep, timeout};

#[derive(Debug)]
enum Msg {
    List(todo_list::Message),
    Quit,
}

/// Activates a list and quits after `quit_after`, whatever the fetch is doing.
struct QuitWhileLoading {
    list: TodoList,
}

impl Application for QuitWhileLoading {
    type Message = Msg;
    type Flags = (SharedListFetcher, Duration);

    fn new((fetcher, quit_after): Self::Flags) -> (Self, Command<Msg>) {
        let mut list = TodoList::new("Todos", fetcher);
        let cmd = Command::batch([
            list.update(todo_list::Message::Activate).map(Msg::List),
            Command::future(async move {
                sleep(quit_after).await;
                Msg::Quit
            }),
        ]);
        (Self { list }, cmd)
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::List(msg) => self.list.update(msg).map(Msg::List),
            Msg::Quit => Command::effect(Action::Quit),
        }
    }

    fn view(&self, frame: &mut Frame<'_>) {
        self.list.render(frame, frame.area());
    }

    fn subscriptions(&self) -> Vec<Subscription<Msg>> {
        vec![]
    }
}

fn never_resolves() -> SharedListFetcher {
    let fetcher = || -> BoxFuture<'static, Result<Vec<ListItem>, FetchFailure>> {
        Box::pin(std::future::pending())
    };
    Arc::new(fetcher)
}

#[tokio::test]
async fn test_quit_is_not_blocked_by_pending_fetch() {
    let mut terminal = test_terminal();
    let runtime = Runtime::<QuitWhileLoading>::new((never_resolves(), Duration::from_millis(30)));

    let start = Instant::now();
    let result = timeout(Duration::from_secs(1), runtime.run(&mut terminal, 60)).await;
    let elapsed = start.elapsed();

    assert!(result.is_ok(), "Runtime should quit within 1 second");
    assert!(result.unwrap().is_ok(), "Runtime should complete without error");
    assert!(
        elapsed < Duration::from_millis(300),
        "Quit took {elapsed:?} with a fetch in flight"
    );
}

#[tokio::test]
async fn test_quit_during_slow_request_at_low_framerate() {
    // The slow route answers after 200ms; 10 FPS is 100ms per frame.
    let server = MockTodoServer::start().await;
    let fetcher: SharedListFetcher =
        Arc::new(HttpFetcher::new(FetchConfig::new(server.url("/slow"))));
    let mut terminal = test_terminal();
    let runtime = Runtime::<QuitWhileLoading>::new((fetcher, Duration::from_millis(50)));

    let start = Instant::now();
    let result = timeout(Duration::from_millis(500), runtime.run(&mut terminal, 10)).await;
    let elapsed = start.elapsed();

    assert!(result.is_ok(), "Runtime should quit within 500ms");
    assert!(result.unwrap().is_ok());
    assert!(
        elapsed < Duration::from_millis(180),
        "Quit took {elapsed:?}; it should not wait for the response"
    );
}

struct InitQuitApp;

impl Application for InitQuitApp {
    type Message = ();
    type Flags = ();

    fn new(_flags: ()) -> (Self, Command<Self::Message>) {
        (Self, Command::effect(Action::Quit))
    }

    fn update(&mut self, _msg: Self::Message) -> Command<Self::Message> {
        Command::none()
    }

    fn view(&self, _frame: &mut Frame<'_>) {}

    fn subscriptions(&self) -> Vec<Subscription<Self::Message>> {
        vec![]
    }
}

#[tokio::test]
async fn test_quit_from_init_command() {
    let mut terminal = test_terminal();
    let runtime = Runtime::<InitQuitApp>::new(());

    let start = Instant::now();
    let result = timeout(Duration::from_secs(1), runtime.run(&mut terminal, 16)).await;
    let elapsed = start.elapsed();

    assert!(result.is_ok(), "Runtime should quit within 1 second");
    assert!(result.unwrap().is_ok());
    assert!(
        elapsed < Duration::from_millis(150),
        "Init quit took {elapsed:?}"
    );
}
