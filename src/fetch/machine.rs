//! The fetch state machine behind a list component.
//!
//! Each activation or refetch starts a new *attempt*: the outcome is reset to
//! [`FetchOutcome::Pending`] and the fetcher is invoked exactly once. The
//! attempt ends when its resolution is applied with [`FetchMachine::resolve`].
//!
//! A resolution is applied only if it belongs to the current attempt, the
//! machine is still active, and the attempt has not resolved yet. Late results
//! of superseded attempts, or results that arrive after deactivation, are
//! dropped. That keeps two guarantees:
//!
//! - every attempt goes `Loading` → `Success` | `Error` and never both;
//! - nothing is written to a component after it deactivated.
//!
//! ```
//! use tears_fetch::fetch::{FetchFailure, FetchMachine, ViewState};
//!
//! let mut machine = FetchMachine::<Vec<u32>>::new();
//! let attempt = machine.activate();
//! assert_eq!(machine.view(), ViewState::Loading);
//!
//! assert!(machine.resolve(attempt, Ok(vec![1, 2])));
//! assert_eq!(machine.view(), ViewState::Success(&vec![1, 2]));
//!
//! // A second resolution for the same attempt is ignored.
//! assert!(!machine.resolve(attempt, Err(FetchFailure::new("late"))));
//! ```

use tracing::debug;

use crate::Command;

use super::{FetchFailure, Fetcher};

/// The outcome of the current fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    Pending,
    Succeeded(T),
    Failed(FetchFailure),
}

/// What a list component renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    Loading,
    Success(T),
    Error(FetchFailure),
}

impl<T> ViewState<T> {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns the data if the fetch succeeded, otherwise `None`.
    pub fn data(self) -> Option<T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewState<U> {
        match self {
            Self::Loading => ViewState::Loading,
            Self::Success(data) => ViewState::Success(f(data)),
            Self::Error(failure) => ViewState::Error(failure),
        }
    }
}

/// Identifies one fetch attempt of a [`FetchMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttemptId(u64);

/// The result of one attempt, tagged with the attempt it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub attempt: AttemptId,
    pub result: Result<T, FetchFailure>,
}

/// Fetch state of one component instance.
#[derive(Debug)]
pub struct FetchMachine<T> {
    attempt: AttemptId,
    outcome: FetchOutcome<T>,
    active: bool,
}

impl<T> Default for FetchMachine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FetchMachine<T> {
    /// Creates an inactive machine. Its view is `Loading` until an attempt resolves.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attempt: AttemptId(0),
            outcome: FetchOutcome::Pending,
            active: false,
        }
    }

    /// Activates the component and starts a new attempt.
    ///
    /// Activating an already active machine also starts a new attempt; the
    /// previous one can no longer resolve.
    pub fn activate(&mut self) -> AttemptId {
        self.active = true;
        self.begin()
    }

    /// Starts a new attempt if the component is active.
    pub fn refetch(&mut self) -> Option<AttemptId> {
        self.active.then(|| self.begin())
    }

    /// Deactivates the component and discards its outcome.
    pub fn deactivate(&mut self) {
        debug!(attempt = ?self.attempt, "deactivating fetch machine");
        self.active = false;
        self.outcome = FetchOutcome::Pending;
    }

    /// Applies the result of `attempt`. Returns whether it was applied.
    pub fn resolve(&mut self, attempt: AttemptId, result: Result<T, FetchFailure>) -> bool {
        if !self.active {
            debug!(?attempt, "ignoring resolution after deactivation");
            return false;
        }
        if attempt != self.attempt {
            debug!(?attempt, current = ?self.attempt, "ignoring resolution of superseded attempt");
            return false;
        }
        if !matches!(self.outcome, FetchOutcome::Pending) {
            debug!(?attempt, "ignoring second resolution of attempt");
            return false;
        }

        self.outcome = match result {
            Ok(data) => FetchOutcome::Succeeded(data),
            Err(failure) => FetchOutcome::Failed(failure),
        };
        true
    }

    /// Applies a [`Resolved`] message. See [`FetchMachine::resolve`].
    pub fn apply(&mut self, resolved: Resolved<T>) -> bool {
        self.resolve(resolved.attempt, resolved.result)
    }

    /// The renderable view of the current outcome.
    pub fn view(&self) -> ViewState<&T> {
        match &self.outcome {
            FetchOutcome::Pending => ViewState::Loading,
            FetchOutcome::Succeeded(data) => ViewState::Success(data),
            FetchOutcome::Failed(failure) => ViewState::Error(failure.clone()),
        }
    }

    pub const fn outcome(&self) -> &FetchOutcome<T> {
        &self.outcome
    }

    pub const fn attempt(&self) -> AttemptId {
        self.attempt
    }

    pub const fn is_active(&self) -> bool {
        self.active
    }

    fn begin(&mut self) -> AttemptId {
        self.attempt = AttemptId(self.attempt.0 + 1);
        self.outcome = FetchOutcome::Pending;
        debug!(attempt = ?self.attempt, "starting fetch attempt");
        self.attempt
    }
}

/// Invokes `fetcher` once and reports the result for `attempt`.
pub fn fetch_command<F>(fetcher: &F, attempt: AttemptId) -> Command<Resolved<F::Output>>
where
    F: Fetcher + ?Sized,
{
    Command::perform(fetcher.fetch(), move |result| Resolved { attempt, result })
}
