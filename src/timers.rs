//! Delayed UI tasks (chat input focus, simulated bot replies).
//!
//! Every task is a tokio task that sleeps for its delay and then runs once.
//! Tasks are registered under a [`TaskKey`] naming the widget job they belong
//! to so they can be counted or cancelled per key. The engine itself never
//! cancels: overlapping tasks for the same key each fire independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKey {
    /// Move focus into the chat input once the panel has opened
    ChatFocus,
    /// Append the canned bot reply after a visitor message
    ChatReply,
}

#[derive(Debug, Clone, Default)]
pub struct Timers {
    tasks: Arc<Mutex<HashMap<TaskKey, Vec<JoinHandle<()>>>>>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    fn tasks(&self) -> MutexGuard<'_, HashMap<TaskKey, Vec<JoinHandle<()>>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `task` once after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: TaskKey, delay: Duration, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            task();
        });

        let mut tasks = self.tasks();
        let handles = tasks.entry(key).or_default();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
        debug!("Scheduled {:?} in {:?} ({} pending)", key, delay, handles.len());
    }

    /// Number of tasks under `key` that have not run yet.
    pub fn pending(&self, key: TaskKey) -> usize {
        self.tasks()
            .get(&key)
            .map(|handles| handles.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }

    /// Abort every task under `key` that has not run yet. Returns how many.
    pub fn cancel(&self, key: TaskKey) -> usize {
        let Some(handles) = self.tasks().remove(&key) else {
            return 0;
        };

        let mut cancelled = 0;
        for handle in handles {
            if !handle.is_finished() {
                handle.abort();
                cancelled += 1;
            }
        }
        cancelled
    }
}
