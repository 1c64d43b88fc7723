//! View-state machines in Model-View-Intent style.
//!
//! ```text
//! Action ──→ Reducer ──→ State ──→ host
//!              │  ↑
//!      Command │  │ completion Intent
//!              ↓  │
//!            Effect (repository call on a tokio task)
//! ```
//!
//! The reducer is pure. Anything that touches the repository is returned as
//! a command, run by [`Store`] on a spawned task, and fed back as an intent.

pub mod detail;
pub mod favorites;
pub mod list;

use std::{mem, panic::AssertUnwindSafe, sync::Arc};

use async_trait::async_trait;
use futures::FutureExt;
use tokio::task::JoinSet;
use tracing::error;

use crate::repository::MovieRepository;

/// Marker trait for everything a reducer accepts: user actions and effect completions.
pub trait Intent: Send + 'static {}

/// Marker trait for view state. Cloneable so hosts can hand out snapshots.
pub trait UiState: Clone + PartialEq + Default + Send + 'static {}

pub trait Reducer {
    type State: UiState;
    type Intent: Intent;
    type Command: Effect<Intent = Self::Intent>;

    /// `(State, Intent) -> (State, Commands)`, no side effects.
    fn reduce(state: Self::State, intent: Self::Intent) -> (Self::State, Vec<Self::Command>);
}

/// A repository call requested by a reducer. Always resolves to an intent,
/// failures included.
#[async_trait]
pub trait Effect: Send + 'static {
    type Intent: Intent;

    async fn run(self, repository: Arc<dyn MovieRepository>) -> Self::Intent;

    /// The intent to deliver when `run` never produces one.
    fn failed(&self, message: String) -> Self::Intent;
}

/// Owns one state machine instance.
///
/// All state changes go through `&mut self`, so there is exactly one writer.
/// `send` returns as soon as the reducer ran; effects resolve later and are
/// applied by [`Store::next`] or [`Store::settle`]. In-flight effects are not
/// fenced against each other. A panicking effect resolves to its
/// [`Effect::failed`] intent. Dropping the store aborts whatever is still running.
pub struct Store<R: Reducer> {
    state: R::State,
    repository: Arc<dyn MovieRepository>,
    tasks: JoinSet<R::Intent>,
}

impl<R: Reducer> Store<R> {
    pub fn new(repository: Arc<dyn MovieRepository>) -> Self {
        Self::with_state(repository, R::State::default())
    }

    pub fn with_state(repository: Arc<dyn MovieRepository>, state: R::State) -> Self {
        Self { state, repository, tasks: JoinSet::new() }
    }

    pub fn state(&self) -> &R::State {
        &self.state
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Applies `intent` and spawns whatever effects it asked for.
    ///
    /// Must be called from within a tokio runtime.
    pub fn send(&mut self, intent: impl Into<R::Intent>) {
        let state = mem::take(&mut self.state);
        let (state, commands) = R::reduce(state, intent.into());
        self.state = state;

        for command in commands {
            self.spawn(command);
        }
    }

    fn spawn(&mut self, command: R::Command) {
        let repository = self.repository.clone();
        let fallback = command.failed("effect panicked".to_string());
        self.tasks.spawn(async move {
            match AssertUnwindSafe(command.run(repository)).catch_unwind().await {
                Ok(intent) => intent,
                Err(_) => {
                    error!("effect panicked, delivering failure");
                    fallback
                },
            }
        });
    }

    /// Waits for the next effect to finish and applies its result.
    /// Returns `false` when nothing is in flight.
    pub async fn next(&mut self) -> bool {
        match self.tasks.join_next().await {
            None => false,
            Some(Ok(intent)) => {
                self.send(intent);
                true
            },
            Some(Err(err)) => {
                error!(error = %err, "effect task did not complete");
                true
            },
        }
    }

    /// Applies completions until no effect is in flight, including effects
    /// spawned by those completions.
    pub async fn settle(&mut self) {
        while self.next().await {}
    }
}
