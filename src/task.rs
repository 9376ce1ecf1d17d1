//! Asynchronous batch tasks.
//!
//! Long-running queries (batch generation across many types, probing many
//! environments) run as [`Task`]s on the tokio runtime. Tasks can be awaited
//! individually through [`Task::result`] or jointly through [`await_all`],
//! which never fails fast: every task is driven to its end, all failures are
//! collected into one [`ForgeError::Composite`], and tasks cancelled via
//! [`Task::abort`] are treated as benign and excluded from the aggregate.

use std::future::Future;

use tokio::task::JoinHandle;

use crate::error::{ForgeError, ForgeResult};

/// Handle over one spawned computation.
#[derive(Debug)]
pub struct Task<V> {
    handle: JoinHandle<ForgeResult<V>>,
}

impl<V: Send + 'static> Task<V> {
    /// Spawns `future` onto the current runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ForgeResult<V>> + Send + 'static,
    {
        Task {
            handle: tokio::spawn(future),
        }
    }

    /// Runs a synchronous computation on the blocking pool; used for compiler
    /// and filesystem work that must not stall the runtime.
    pub fn spawn_blocking<F>(f: F) -> Self
    where
        F: FnOnce() -> ForgeResult<V> + Send + 'static,
    {
        Task {
            handle: tokio::task::spawn_blocking(f),
        }
    }

    /// A task that is already done with `value`.
    pub fn completed(value: V) -> Self {
        Task::spawn(async move { Ok(value) })
    }

    /// A task that is already done with `error`.
    pub fn completed_err(error: ForgeError) -> Self {
        Task::spawn(async move { Err(error) })
    }

    /// Requests cancellation. A cancelled task is skipped by the aggregate
    /// awaits.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Awaits this task alone. Failures propagate; a task that panicked or
    /// was cancelled before completion surfaces as [`ForgeError::Task`].
    pub async fn result(self) -> ForgeResult<V> {
        match self.handle.await {
            Ok(result) => result,
            Err(join) => Err(ForgeError::Task {
                message: join.to_string(),
            }),
        }
    }
}

/// Awaits every task, collecting all failures instead of failing fast.
/// Returns the values of the tasks that completed; cancelled tasks produce
/// neither a value nor a failure. Any real failure turns the whole call into
/// one [`ForgeError::Composite`] carrying every nested cause.
pub async fn await_all<V: Send + 'static>(
    tasks: impl IntoIterator<Item = Task<V>>,
) -> ForgeResult<Vec<V>> {
    let mut values = Vec::new();
    let mut failures = Vec::new();
    for task in tasks {
        match task.handle.await {
            Ok(Ok(value)) => values.push(value),
            Ok(Err(error)) => failures.push(error),
            Err(join) if join.is_cancelled() => {
                tracing::debug!("cancelled task excluded from aggregate await");
            }
            Err(join) => failures.push(ForgeError::Task {
                message: join.to_string(),
            }),
        }
    }
    if failures.is_empty() {
        Ok(values)
    } else {
        Err(ForgeError::Composite { errors: failures })
    }
}

/// Like [`await_all`], but logs each nested failure instead of returning the
/// aggregate. For fire-and-forget batches whose callers cannot act on the
/// errors anyway.
pub async fn await_all_logging<V: Send + 'static>(
    tasks: impl IntoIterator<Item = Task<V>>,
) -> Vec<V> {
    match await_all(tasks).await {
        Ok(values) => values,
        Err(aggregate) => {
            for error in aggregate.nested() {
                tracing::warn!(error = %error, "batch task failed");
            }
            Vec::new()
        }
    }
}
