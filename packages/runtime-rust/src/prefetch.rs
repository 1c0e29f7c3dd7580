//! Keyed background task group for the prefetch phase of a concurrent router.
//!
//! Tasks run on the `tokio` runtime while the invoking task waits for all of
//! them under one deadline. The first failure observed ends the wait; tasks
//! still running are aborted when the group is dropped.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, warn};
use winter_core::DynamicContext;

use crate::config::RuntimeConfig;

/// Failure of the prefetch phase. Any variant aborts the invocation.
#[derive(Debug, thiserror::Error)]
pub enum PrefetchError {
    /// A task returned an error or panicked. `key` is unknown for panics.
    #[error("prefetch task {} failed: {source:#}", .key.as_deref().unwrap_or("<panicked>"))]
    Execution {
        key: Option<String>,
        #[source]
        source: anyhow::Error,
    },
    /// A task was cancelled before it produced a value.
    #[error("prefetch task was cancelled")]
    Interrupted,
    /// The deadline passed with tasks still running.
    #[error("prefetch timed out after {timeout_ms}ms with {pending} task(s) pending")]
    Timeout { timeout_ms: u64, pending: usize },
}

type Keyed<O> = (String, anyhow::Result<O>);

/// A group of keyed background tasks joined under one deadline.
pub struct Prefetch<O> {
    tasks: JoinSet<Keyed<O>>,
    timeout: Duration,
}

impl<O: Send + 'static> Prefetch<O> {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            tasks: JoinSet::new(),
            timeout,
        }
    }

    /// Group whose deadline is `config.prefetch_timeout_ms`.
    #[must_use]
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.prefetch_timeout())
    }

    /// Start `task` in the background; its value is reported under `key`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a `tokio` runtime.
    pub fn spawn<F>(&mut self, key: impl Into<String>, task: F)
    where
        F: Future<Output = anyhow::Result<O>> + Send + 'static,
    {
        let key = key.into();
        self.tasks.spawn(async move { (key, task.await) });
    }

    /// Cancel every outstanding task. A later `join` reports `Interrupted`.
    pub fn cancel(&mut self) {
        self.tasks.abort_all();
    }

    /// Number of tasks not yet joined.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait for every task and return the values in completion order.
    ///
    /// # Errors
    ///
    /// `PrefetchError::Timeout` if the deadline passes first, otherwise the
    /// first task failure observed.
    pub async fn join(mut self) -> Result<Vec<(String, O)>, PrefetchError> {
        let started = self.tasks.len();
        match tokio::time::timeout(self.timeout, collect(&mut self.tasks)).await {
            Ok(Ok(values)) => {
                debug!(tasks = started, "prefetch complete");
                Ok(values)
            }
            Ok(Err(err)) => {
                debug!(error = %err, "prefetch failed");
                Err(err)
            }
            Err(_elapsed) => {
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                let pending = self.tasks.len();
                warn!(timeout_ms, pending, "prefetch timed out");
                Err(PrefetchError::Timeout { timeout_ms, pending })
            }
        }
    }

    /// Wait for every task and store each value in `context` under its key.
    ///
    /// # Errors
    ///
    /// Same as [`Prefetch::join`]; `context` is untouched on failure.
    pub async fn join_into(self, context: &mut DynamicContext) -> Result<(), PrefetchError>
    where
        O: Any + Sync,
    {
        for (key, value) in self.join().await? {
            context.set_value(key, value);
        }
        Ok(())
    }
}

async fn collect<O: 'static>(
    tasks: &mut JoinSet<Keyed<O>>,
) -> Result<Vec<(String, O)>, PrefetchError> {
    let mut values = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((key, Ok(value))) => values.push((key, value)),
            Ok((key, Err(source))) => {
                return Err(PrefetchError::Execution {
                    key: Some(key),
                    source,
                })
            }
            Err(err) => return Err(join_failure(err)),
        }
    }
    Ok(values)
}

fn join_failure(err: JoinError) -> PrefetchError {
    if err.is_cancelled() {
        return PrefetchError::Interrupted;
    }
    let message = match err.try_into_panic() {
        Ok(payload) => panic_message(payload.as_ref()),
        Err(err) => err.to_string(),
    };
    PrefetchError::Execution {
        key: None,
        source: anyhow::anyhow!("task panicked: {message}"),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl<O> fmt::Debug for Prefetch<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prefetch")
            .field("pending", &self.tasks.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn join_collects_every_value() {
        let mut prefetch = Prefetch::new(Duration::from_secs(1));
        prefetch.spawn("price", async { Ok(120_u32) });
        prefetch.spawn("stock", async { Ok(7_u32) });
        assert_eq!(prefetch.len(), 2);

        let mut values = prefetch.join().await.unwrap();
        values.sort();
        assert_eq!(values, vec![("price".to_string(), 120), ("stock".to_string(), 7)]);
    }

    #[tokio::test]
    async fn empty_group_joins_immediately() {
        let prefetch: Prefetch<()> = Prefetch::from_config(&RuntimeConfig::default());
        assert!(prefetch.is_empty());
        assert_eq!(prefetch.timeout(), Duration::from_secs(5));
        assert!(prefetch.join().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn join_into_stores_values_by_key() {
        let mut prefetch = Prefetch::new(Duration::from_secs(1));
        prefetch.spawn("user", async { Ok("alice".to_string()) });
        prefetch.spawn("tier", async { Ok("gold".to_string()) });

        let mut ctx = DynamicContext::new();
        prefetch.join_into(&mut ctx).await.unwrap();

        assert_eq!(ctx.get_value::<String>("user").map(String::as_str), Some("alice"));
        assert_eq!(ctx.get_value::<String>("tier").map(String::as_str), Some("gold"));
    }

    #[tokio::test]
    async fn task_error_is_execution_failure_with_key() {
        let mut prefetch: Prefetch<u32> = Prefetch::new(Duration::from_secs(1));
        prefetch.spawn("inventory", async { Err(anyhow::anyhow!("inventory service down")) });

        let err = prefetch.join().await.unwrap_err();
        match err {
            PrefetchError::Execution { key, source } => {
                assert_eq!(key.as_deref(), Some("inventory"));
                assert_eq!(source.to_string(), "inventory service down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn panic_is_execution_failure() {
        let mut prefetch: Prefetch<u32> = Prefetch::new(Duration::from_secs(1));
        prefetch.spawn("boom", async {
            let missing: Option<u32> = None;
            Ok(missing.expect("exploded"))
        });

        let err = prefetch.join().await.unwrap_err();
        assert!(matches!(err, PrefetchError::Execution { key: None, .. }));
        assert!(err.to_string().contains("exploded"));
    }

    #[tokio::test]
    async fn cancelled_tasks_are_interrupted() {
        let mut prefetch: Prefetch<u32> = Prefetch::new(Duration::from_secs(1));
        prefetch.spawn("slow", async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(1)
        });
        prefetch.cancel();

        let err = prefetch.join().await.unwrap_err();
        assert!(matches!(err, PrefetchError::Interrupted));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_reports_timeout_and_pending_count() {
        let mut prefetch = Prefetch::new(Duration::from_millis(50));
        prefetch.spawn("fast", async { Ok(1_u32) });
        prefetch.spawn("slow", async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(2_u32)
        });

        let err = prefetch.join().await.unwrap_err();
        assert!(matches!(err, PrefetchError::Timeout { timeout_ms: 50, pending: 1 }));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_join_leaves_context_untouched() {
        let mut prefetch = Prefetch::new(Duration::from_millis(10));
        prefetch.spawn("late", async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(5_u64)
        });

        let mut ctx = DynamicContext::new();
        assert!(prefetch.join_into(&mut ctx).await.is_err());
        assert!(ctx.is_empty());
    }
}
