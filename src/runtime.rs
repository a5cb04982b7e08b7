use std::time::Duration;

use color_eyre::eyre::Result;
use futures::stream::StreamExt;
use ratatui::Terminal;
use ratatui::prelude::Backend;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

use crate::{
    application::Application,
    command::{Action, Command},
    subscription::SubscriptionManager,
};

/// Drives an [`Application`]: renders frames, executes commands, delivers
/// messages to `update`, and keeps subscriptions in sync.
///
/// `update` and `view` only ever run on the task that calls [`Runtime::run`];
/// commands and subscriptions run as separate tasks and talk to it through a channel.
pub struct Runtime<A: Application> {
    app: A,
    init: Option<Command<A::Message>>,
    tx: mpsc::UnboundedSender<Action<A::Message>>,
    rx: mpsc::UnboundedReceiver<Action<A::Message>>,
    subscription_manager: SubscriptionManager<A::Message>,
}

impl<A: Application> Runtime<A> {
    /// Creates the application from `flags`. Its initial command runs once `run` starts.
    pub fn new(flags: A::Flags) -> Self {
        let (app, init) = A::new(flags);
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription_manager = SubscriptionManager::new(tx.clone());

        Self {
            app,
            init: Some(init),
            tx,
            rx,
            subscription_manager,
        }
    }

    /// Returns the application state.
    pub const fn app(&self) -> &A {
        &self.app
    }

    fn execute(&self, cmd: Command<A::Message>) {
        if let Some(mut stream) = cmd.stream {
            let tx = self.tx.clone();
            tokio::spawn(async move {
                while let Some(action) = stream.next().await {
                    if tx.send(action).is_err() {
                        break;
                    }
                }
            });
        }
    }

    /// Applies one action. Returns `false` when the application asked to quit.
    fn handle(&mut self, action: Action<A::Message>) -> bool {
        match action {
            Action::Message(msg) => {
                let cmd = self.app.update(msg);
                self.execute(cmd);
                self.subscription_manager.update(self.app.subscriptions());
                true
            }
            Action::Quit => false,
        }
    }

    /// Runs the event loop until an [`Action::Quit`] is received.
    ///
    /// A frame is drawn at most `frame_rate` times per second and after every
    /// batch of messages. Quit requests are handled as soon as they arrive,
    /// regardless of the frame rate. All subscriptions are cancelled before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing to the terminal fails.
    pub async fn run<B: Backend>(mut self, terminal: &mut Terminal<B>, frame_rate: u32) -> Result<()> {
        let frame_duration = Duration::from_millis(1000 / u64::from(frame_rate.max(1)));
        let mut frames = interval(frame_duration);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.subscription_manager.update(self.app.subscriptions());
        if let Some(init) = self.init.take() {
            self.execute(init);
        }

        let result = self.event_loop(terminal, &mut frames).await;

        debug!("runtime stopping");
        self.subscription_manager.shutdown().await;
        result
    }

    async fn event_loop<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        frames: &mut tokio::time::Interval,
    ) -> Result<()> {
        loop {
            terminal.draw(|frame| self.app.view(frame))?;

            tokio::select! {
                _ = frames.tick() => {}
                action = self.rx.recv() => {
                    // The runtime holds a sender, so the channel never closes while running.
                    let Some(action) = action else { return Ok(()) };
                    if !self.handle(action) {
                        return Ok(());
                    }
                    while let Ok(action) = self.rx.try_recv() {
                        if !self.handle(action) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::Subscription;
    use ratatui::{Frame, backend::TestBackend};
    use tokio::time::timeout;

    struct Echo {
        seen: Vec<u32>,
    }

    impl Application for Echo {
        type Message = u32;
        type Flags = Vec<u32>;

        fn new(flags: Vec<u32>) -> (Self, Command<u32>) {
            let cmd = Command::batch(flags.into_iter().map(Command::message));
            (Self { seen: Vec::new() }, cmd)
        }

        fn update(&mut self, msg: u32) -> Command<u32> {
            self.seen.push(msg);
            Command::none()
        }

        fn view(&self, _frame: &mut Frame<'_>) {}

        fn subscriptions(&self) -> Vec<Subscription<u32>> {
            vec![]
        }
    }

    #[test]
    fn test_new_does_not_run_update() {
        let runtime = Runtime::<Echo>::new(vec![1, 2]);
        assert!(runtime.app().seen.is_empty());
        assert!(runtime.init.is_some());
    }

    #[tokio::test]
    async fn test_handle_message_runs_update() {
        let mut runtime = Runtime::<Echo>::new(vec![]);
        assert!(runtime.handle(Action::Message(5)));
        assert_eq!(runtime.app().seen, vec![5]);
    }

    #[tokio::test]
    async fn test_handle_quit_stops() {
        let mut runtime = Runtime::<Echo>::new(vec![]);
        assert!(!runtime.handle(Action::Quit));
    }

    #[tokio::test]
    async fn test_execute_forwards_every_action() {
        let mut runtime = Runtime::<Echo>::new(vec![]);
        runtime.execute(Command::stream(futures::stream::iter(vec![1, 2, 3])));

        let mut received = Vec::new();
        for _ in 0..3 {
            match timeout(Duration::from_millis(100), runtime.rx.recv()).await {
                Ok(Some(Action::Message(msg))) => received.push(msg),
                _ => panic!("expected a message"),
            }
        }
        assert_eq!(received, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_run_quits_from_update() {
        struct QuitOnFirst;

        impl Application for QuitOnFirst {
            type Message = ();
            type Flags = ();

            fn new((): ()) -> (Self, Command<()>) {
                (Self, Command::message(()))
            }

            fn update(&mut self, (): ()) -> Command<()> {
                Command::effect(Action::Quit)
            }

            fn view(&self, _frame: &mut Frame<'_>) {}

            fn subscriptions(&self) -> Vec<Subscription<()>> {
                vec![]
            }
        }

        let mut terminal = Terminal::new(TestBackend::new(20, 5)).expect("test backend");
        let runtime = Runtime::<QuitOnFirst>::new(());
        let result = timeout(Duration::from_secs(1), runtime.run(&mut terminal, 30)).await;

        assert!(matches!(result, Ok(Ok(()))));
    }
}
