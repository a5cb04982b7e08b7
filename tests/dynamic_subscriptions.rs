// Subscriptions follow the declared set: auto refresh starts and stops with its
// toggle, and a cached list releases its query when deactivated.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::test_terminal;
use futures::future::BoxFuture;
use ratatui::Frame;
use tears_fetch::component::{TodoList, todo_list};
use tears_fetch::fetch::SharedListFetcher;
use tears_fetch::prelude::*;
use tears_fetch::subscription::mock::MockSource;
use tears_fetch::subscription::time::Timer;
use tokio::time::{Duration, sleep, timeout};

fn counting_fetcher(calls: Arc<AtomicUsize>) -> SharedListFetcher {
    let fetcher = move || -> BoxFuture<'static, Result<Vec<ListItem>, FetchFailure>> {
        calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(Vec::new()) })
    };
    Arc::new(fetcher)
}

#[derive(Debug, Clone, Copy)]
enum Control {
    /// Forces an update without changing any state.
    Nudge,
    Toggle,
    Quit,
}

#[derive(Debug)]
enum Msg {
    List(todo_list::Message),
    AutoRefresh,
    Control(Control),
}

/// A list refetched by a timer while `auto_refresh` is on.
struct AutoRefreshApp {
    list: TodoList,
    auto_refresh: bool,
    control: MockSource<Control>,
}

impl Application for AutoRefreshApp {
    type Message = Msg;
    type Flags = (SharedListFetcher, MockSource<Control>);

    fn new((fetcher, control): Self::Flags) -> (Self, Command<Msg>) {
        let mut list = TodoList::new("Todos", fetcher);
        let cmd = list.update(todo_list::Message::Activate).map(Msg::List);
        let app = Self {
            list,
            auto_refresh: true,
            control,
        };
        (app, cmd)
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::List(msg) => self.list.update(msg).map(Msg::List),
            Msg::AutoRefresh => self.list.update(todo_list::Message::Refetch).map(Msg::List),
            Msg::Control(Control::Nudge) => Command::none(),
            Msg::Control(Control::Toggle) => {
                self.auto_refresh = !self.auto_refresh;
                Command::none()
            }
            Msg::Control(Control::Quit) => Command::effect(Action::Quit),
        }
    }

    fn view(&self, frame: &mut Frame<'_>) {
        self.list.render(frame, frame.area());
    }

    fn subscriptions(&self) -> Vec<Subscription<Msg>> {
        let mut subs = vec![Subscription::new(self.control.clone()).map(Msg::Control)];
        if self.auto_refresh {
            subs.push(Subscription::new(Timer::new(10)).map(|_| Msg::AutoRefresh));
        }
        subs
    }
}

async fn listening<T: Clone + Send + 'static>(control: &MockSource<T>) {
    timeout(Duration::from_secs(1), async {
        while control.receiver_count() == 0 {
            sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("app subscribed to its control source");
}

#[tokio::test]
async fn test_auto_refresh_refetches_until_disabled() {
    let calls = Arc::new(AtomicUsize::new(0));
    let control = MockSource::new();
    let mut terminal = test_terminal();
    let runtime = Runtime::<AutoRefreshApp>::new((counting_fetcher(calls.clone()), control.clone()));

    let script = async {
        listening(&control).await;
        sleep(Duration::from_millis(60)).await;
        control.emit(Control::Toggle).unwrap();
        sleep(Duration::from_millis(20)).await;
        let after_toggle = calls.load(Ordering::SeqCst);
        sleep(Duration::from_millis(60)).await;
        control.emit(Control::Quit).unwrap();
        after_toggle
    };
    let (result, after_toggle) = tokio::join!(runtime.run(&mut terminal, 60), script);
    result.expect("runtime exits cleanly");

    assert!(after_toggle >= 3, "activation plus timer refetches, got {after_toggle}");
    assert_eq!(
        calls.load(Ordering::SeqCst),
        after_toggle,
        "no refetch after auto refresh was turned off"
    );
}

#[tokio::test]
async fn test_unchanged_timer_is_not_restarted() {
    let calls = Arc::new(AtomicUsize::new(0));
    let control = MockSource::new();
    let mut terminal = test_terminal();
    let runtime = Runtime::<AutoRefreshApp>::new((counting_fetcher(calls.clone()), control.clone()));

    let script = async {
        listening(&control).await;
        // Every update re-declares the timer. Restarting it each time would
        // postpone its 10ms tick past every 5ms nudge.
        for _ in 0..20 {
            control.emit(Control::Nudge).unwrap();
            sleep(Duration::from_millis(5)).await;
        }
        control.emit(Control::Quit).unwrap();
    };
    let (result, ()) = tokio::join!(runtime.run(&mut terminal, 60), script);
    result.expect("runtime exits cleanly");

    assert!(calls.load(Ordering::SeqCst) > 1, "the timer kept ticking");
}

mod cached {
    use super::*;
    use tears_fetch::component::{CachedTodoList, cached_list};
    use tears_fetch::subscription::http::QueryClient;

    #[derive(Debug, Clone, Copy)]
    enum Input {
        Activate,
        Deactivate,
        Quit,
    }

    #[derive(Debug)]
    enum Msg {
        Input(Input),
        List(cached_list::Message),
    }

    struct CachedApp {
        list: CachedTodoList,
        input: MockSource<Input>,
    }

    impl Application for CachedApp {
        type Message = Msg;
        type Flags = (SharedListFetcher, MockSource<Input>);

        fn new((fetcher, input): Self::Flags) -> (Self, Command<Msg>) {
            let list = CachedTodoList::new("Cached", "todos", fetcher, Arc::new(QueryClient::new()));
            (Self { list, input }, Command::none())
        }

        fn update(&mut self, msg: Msg) -> Command<Msg> {
            let msg = match msg {
                Msg::Input(Input::Quit) => return Command::effect(Action::Quit),
                Msg::Input(Input::Activate) => cached_list::Message::Activate,
                Msg::Input(Input::Deactivate) => cached_list::Message::Deactivate,
                Msg::List(msg) => msg,
            };
            self.list.update(msg).map(Msg::List)
        }

        fn view(&self, frame: &mut Frame<'_>) {
            self.list.render(frame, frame.area());
        }

        fn subscriptions(&self) -> Vec<Subscription<Msg>> {
            let mut subs = vec![Subscription::new(self.input.clone()).map(Msg::Input)];
            subs.extend(self.list.subscriptions().into_iter().map(|sub| sub.map(Msg::List)));
            subs
        }
    }

    #[tokio::test]
    async fn test_query_runs_only_while_list_is_active() {
        let calls = Arc::new(AtomicUsize::new(0));
        let input = MockSource::new();
        let mut terminal = test_terminal();
        let runtime = Runtime::<CachedApp>::new((counting_fetcher(calls.clone()), input.clone()));

        let script = async {
            listening(&input).await;
            sleep(Duration::from_millis(20)).await;
            let before = calls.load(Ordering::SeqCst);

            input.emit(Input::Activate).unwrap();
            sleep(Duration::from_millis(50)).await;
            let active = calls.load(Ordering::SeqCst);

            input.emit(Input::Deactivate).unwrap();
            input.emit(Input::Quit).unwrap();
            (before, active)
        };
        let (result, (before, active)) = tokio::join!(runtime.run(&mut terminal, 60), script);
        result.expect("runtime exits cleanly");

        assert_eq!(before, 0, "an inactive list does not fetch");
        assert_eq!(active, 1, "activation fetches once");
    }
}
