//! Delayed, cancellable callbacks on top of the tokio timer.
//!
//! Every timer is a spawned task that sleeps until its deadline and then runs
//! its future. A shared registry of pending timers settles each timer exactly
//! once: whichever of "fire" or "cancel" removes the registry entry first wins,
//! and the other side becomes a no-op.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("No tokio runtime available to drive timers")]
    NoRuntime,
}

/// Handle to a scheduled timer, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Pending timers. `None` means the task is registered but not yet spawned.
type Registry = HashMap<u64, Option<AbortHandle>>;

/// Schedules futures to run after a delay.
///
/// Cloning is cheap; clones share the same registry, so a handle returned by
/// one clone can be cancelled through another.
#[derive(Clone)]
pub struct TimerScheduler {
    runtime: Handle,
    next_id: Arc<AtomicU64>,
    pending: Arc<Mutex<Registry>>,
}

impl TimerScheduler {
    /// Create a scheduler that spawns its timers on the given runtime.
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: Arc::new(AtomicU64::new(1)),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a scheduler bound to the runtime of the calling context.
    pub fn from_current() -> Result<Self, SchedulerError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| SchedulerError::NoRuntime)
    }

    /// Run `task` once `delay` has elapsed, unless cancelled first.
    pub fn schedule<F>(&self, delay: Duration, task: F) -> TimerHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let deadline = Instant::now() + delay;

        // Register before spawning so the task can never fire unregistered.
        lock(&self.pending).insert(id, None);

        let pending = Arc::clone(&self.pending);
        let join = self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if lock(&pending).remove(&id).is_none() {
                return;
            }
            task.await;
        });

        let mut registry = lock(&self.pending);
        match registry.get_mut(&id) {
            Some(slot) => *slot = Some(join.abort_handle()),
            // Cancelled between registration and spawn.
            None => join.abort(),
        }

        TimerHandle(id)
    }

    /// Cancel a timer that has not fired yet.
    ///
    /// Returns false if the timer already fired or was already cancelled.
    pub fn cancel(&self, handle: TimerHandle) -> bool {
        match lock(&self.pending).remove(&handle.0) {
            Some(abort) => {
                if let Some(abort) = abort {
                    abort.abort();
                }
                true
            }
            None => false,
        }
    }

    /// Cancel every pending timer. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<_> = lock(&self.pending).drain().collect();
        for (_, abort) in &drained {
            if let Some(abort) = abort {
                abort.abort();
            }
        }
        drained.len()
    }

    /// Whether the timer is still waiting to fire.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        lock(&self.pending).contains_key(&handle.0)
    }

    /// Number of timers waiting to fire.
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
