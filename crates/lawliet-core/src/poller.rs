// ── Progress poller ──
//
// Repeatedly fetches the progress of named server operations and hands
// each snapshot to a reducer. At most one poll runs per operation name;
// starting a name that is already polled replaces the old poll.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use lawliet_api::RecoveryClient;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, trace};

use crate::model::Operation;

struct PollEntry {
    generation: u64,
    cancel: CancellationToken,
}

struct PollerInner {
    client: RecoveryClient,
    polls: DashMap<String, PollEntry>,
    tasks: TaskTracker,
    next_generation: AtomicU64,
}

/// Registry of active progress polls, keyed by operation name.
///
/// Cheaply cloneable. Each poll sleeps one interval, fetches, and invokes
/// its reducer with the decoded [`Operation`]. Failed fetches are skipped
/// and retried on the next tick. A poll never stops itself: the reducer
/// (or anyone else) calls [`stop`](Self::stop) when it sees a terminal
/// status. Once stopped, no further reducer invocation happens, even
/// for a fetch that was already on the wire.
#[derive(Clone)]
pub struct ProgressPoller {
    inner: Arc<PollerInner>,
}

impl ProgressPoller {
    pub fn new(client: RecoveryClient) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                client,
                polls: DashMap::new(),
                tasks: TaskTracker::new(),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Begin polling `operation` every `interval`.
    ///
    /// An existing poll for the same name is cancelled first, so after
    /// this returns exactly one poll for `operation` is active.
    pub fn start<F>(&self, operation: impl Into<String>, interval: Duration, on_tick: F)
    where
        F: FnMut(Operation) + Send + 'static,
    {
        let operation = operation.into();
        let cancel = CancellationToken::new();
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);

        let previous = self.inner.polls.insert(
            operation.clone(),
            PollEntry {
                generation,
                cancel: cancel.clone(),
            },
        );
        if let Some(previous) = previous {
            previous.cancel.cancel();
            debug!(%operation, "replaced existing progress poll");
        }

        debug!(%operation, interval_ms = interval.as_millis(), "starting progress poll");
        self.inner.tasks.spawn(poll_task(
            Arc::clone(&self.inner),
            operation,
            generation,
            interval,
            cancel,
            on_tick,
        ));
    }

    /// Stop polling `operation`. A no-op when nothing polls it.
    pub fn stop(&self, operation: &str) {
        if let Some((_, entry)) = self.inner.polls.remove(operation) {
            entry.cancel.cancel();
            debug!(%operation, "stopped progress poll");
        }
    }

    /// Stop every active poll.
    pub fn stop_all(&self) {
        self.inner.polls.retain(|_, entry| {
            entry.cancel.cancel();
            false
        });
    }

    pub fn is_active(&self, operation: &str) -> bool {
        self.inner.polls.contains_key(operation)
    }

    pub fn active_count(&self) -> usize {
        self.inner.polls.len()
    }

    /// Names of the operations currently being polled.
    pub fn active_operations(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.polls.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Stop every poll and wait for the background tasks to exit.
    pub async fn shutdown(&self) {
        self.stop_all();
        self.inner.tasks.close();
        self.inner.tasks.wait().await;
        self.inner.tasks.reopen();
    }
}

// ── Background task ──────────────────────────────────────────────

async fn poll_task<F>(
    inner: Arc<PollerInner>,
    operation: String,
    generation: u64,
    interval: Duration,
    cancel: CancellationToken,
    mut on_tick: F,
) where
    F: FnMut(Operation) + Send + 'static,
{
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }

        // A fetch still in flight when the poll is stopped is dropped
        // here, so its reply never reaches the reducer.
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = inner.client.get_progress(&operation) => result,
        };

        match result {
            Ok(entry) => {
                if cancel.is_cancelled() {
                    break;
                }
                on_tick(Operation::from_entry(&operation, entry));
            }
            Err(e) => {
                debug!(%operation, error = %e, "progress fetch failed, retrying next tick");
            }
        }
    }

    // Only clear our own registration; a replacement may already sit there.
    inner
        .polls
        .remove_if(&operation, |_, entry| entry.generation == generation);
    trace!(%operation, generation, "progress poll exited");
}
