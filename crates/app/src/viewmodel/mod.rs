//! Per-screen state holders.
//!
//! A view-model owns one background task. The task listens to the local
//! store and to actions sent by the screen, turns both into events and folds
//! each event into the current state with a pure `reduce` function. The new
//! state replaces the old one in a watch channel, so a reader always sees a
//! whole snapshot. Dropping the view-model aborts its task.
//!
//! Each cache subscription runs on its own task (see [`forward`]) and feeds
//! the main task through an event channel. A query started by a
//! subscription always runs to completion and releases its connection, even
//! while the main task is busy with an action.

pub mod dashboard;
pub mod subscription;

use std::future::Future;

use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};

pub use dashboard::{DashboardAction, DashboardState, DashboardViewModel};
pub use subscription::{SubscriptionAction, SubscriptionState, SubscriptionViewModel};

/// State snapshot, action sink and the task driving both.
pub struct ViewModel<S, A> {
    state: watch::Receiver<S>,
    actions: mpsc::UnboundedSender<A>,
    task: JoinHandle<()>,
}

impl<S, A> ViewModel<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
{
    /// Start `run` on the runtime with a fresh state channel and action
    /// queue.
    pub(crate) fn spawn<F, Fut>(initial: S, run: F) -> Self
    where
        F: FnOnce(watch::Sender<S>, mpsc::UnboundedReceiver<A>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (state_tx, state) = watch::channel(initial);
        let (actions, actions_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(state_tx, actions_rx));

        Self {
            state,
            actions,
            task,
        }
    }

    /// The latest snapshot.
    #[must_use]
    pub fn state(&self) -> S {
        self.state.borrow().clone()
    }

    /// A receiver that is notified on every new snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state.clone()
    }

    /// Queue an action. Actions sent after the task has stopped are dropped.
    pub fn send(&self, action: A) {
        if self.actions.send(action).is_err() {
            tracing::debug!("View-model task has stopped; action dropped");
        }
    }
}

impl<S, A> Drop for ViewModel<S, A> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Fold `event` into the published state.
pub(crate) fn apply<S, E, F>(state: &watch::Sender<S>, reduce: F, event: E)
where
    S: Clone,
    F: FnOnce(S, E) -> S,
{
    let next = reduce(state.borrow().clone(), event);
    state.send_replace(next);
}

/// Drive `stream` on a task in `tasks`, sending each item to `events`
/// wrapped by `into`.
///
/// The task ends when the stream does or when the receiving side is gone.
/// Dropping `tasks` aborts it.
pub(crate) fn forward<T, E, St>(
    tasks: &mut JoinSet<()>,
    stream: St,
    into: fn(T) -> E,
    events: mpsc::UnboundedSender<E>,
) where
    St: Stream<Item = T> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    tasks.spawn(async move {
        let mut stream = std::pin::pin!(stream);
        while let Some(item) = stream.next().await {
            if events.send(into(item)).is_err() {
                break;
            }
        }
    });
}
