//! Fixed-latency actions with no typing phase (sign-in, save-profile).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::state::Generation;
use crate::config::Timing;
use crate::event::UiEvent;
use crate::event_bus::EventBus;
use crate::notifications::{NotificationKind, NotificationQueue};
use crate::scheduler::{TimerHandle, TimerScheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionPhase {
    Idle,
    Pending,
    Result,
}

/// Notification raised when an action completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub kind: NotificationKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionConfig {
    pub name: String,
    pub latency: Duration,
    pub completion: Option<Completion>,
}

impl ActionConfig {
    pub fn sign_in(timing: &Timing) -> Self {
        Self {
            name: "signIn".to_string(),
            latency: timing.sign_in_latency,
            completion: Some(Completion {
                kind: NotificationKind::Success,
                message: "Welcome back, Architect.".to_string(),
            }),
        }
    }

    pub fn save_profile(timing: &Timing) -> Self {
        Self {
            name: "saveProfile".to_string(),
            latency: timing.save_profile_latency,
            completion: Some(Completion {
                kind: NotificationKind::Success,
                message: "Profile updated successfully.".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSnapshot {
    pub action: String,
    pub phase: ActionPhase,
    pub generation: Generation,
}

struct ActionState {
    phase: ActionPhase,
    generation: Generation,
    timer: Option<TimerHandle>,
}

struct Shared {
    config: ActionConfig,
    state: Mutex<ActionState>,
    scheduler: TimerScheduler,
    notifications: Arc<NotificationQueue>,
    events: Arc<EventBus>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ActionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot_of(&self, state: &ActionState) -> ActionSnapshot {
        ActionSnapshot {
            action: self.config.name.clone(),
            phase: state.phase,
            generation: state.generation,
        }
    }

    fn publish(&self, snapshot: ActionSnapshot) {
        self.events.emit(UiEvent::ActionChanged { snapshot });
    }

    fn on_complete(&self, generation: Generation) {
        let snapshot = {
            let mut state = self.lock();
            if state.generation != generation || state.phase != ActionPhase::Pending {
                log::debug!("Dropping stale {} completion", self.config.name);
                return;
            }
            state.phase = ActionPhase::Result;
            state.timer = None;
            self.snapshot_of(&state)
        };

        log::info!("{} completed", self.config.name);
        self.publish(snapshot);
        if let Some(completion) = &self.config.completion {
            self.notifications
                .enqueue(completion.kind, completion.message.clone());
        }
    }
}

/// A simulated call: `Idle → Pending → Result` after a fixed latency.
///
/// Shares the sequencer's discipline: every `start()` or `cancel()` bumps the
/// generation, and a completion from an older generation is ignored.
pub struct SimulatedAction {
    shared: Arc<Shared>,
}

impl SimulatedAction {
    pub fn new(
        config: ActionConfig,
        scheduler: TimerScheduler,
        notifications: Arc<NotificationQueue>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(ActionState {
                    phase: ActionPhase::Idle,
                    generation: Generation::default(),
                    timer: None,
                }),
                scheduler,
                notifications,
                events,
            }),
        }
    }

    /// Begin the action. Restarting while pending restarts the latency.
    pub fn start(&self) -> Generation {
        let snapshot = {
            let mut state = self.shared.lock();
            if let Some(timer) = state.timer.take() {
                self.shared.scheduler.cancel(timer);
            }
            let generation = state.generation.next();
            state.generation = generation;
            state.phase = ActionPhase::Pending;

            let weak = Arc::downgrade(&self.shared);
            state.timer = Some(self.shared.scheduler.schedule(
                self.shared.config.latency,
                async move {
                    if let Some(shared) = weak.upgrade() {
                        shared.on_complete(generation);
                    }
                },
            ));
            self.shared.snapshot_of(&state)
        };

        log::debug!("{} started", self.shared.config.name);
        let generation = snapshot.generation;
        self.shared.publish(snapshot);
        generation
    }

    pub fn cancel(&self) {
        let snapshot = {
            let mut state = self.shared.lock();
            if let Some(timer) = state.timer.take() {
                self.shared.scheduler.cancel(timer);
            }
            state.generation = state.generation.next();
            state.phase = ActionPhase::Idle;
            self.shared.snapshot_of(&state)
        };
        self.shared.publish(snapshot);
    }

    pub fn snapshot(&self) -> ActionSnapshot {
        let state = self.shared.lock();
        self.shared.snapshot_of(&state)
    }

    pub fn phase(&self) -> ActionPhase {
        self.shared.lock().phase
    }

    pub fn is_pending(&self) -> bool {
        self.phase() == ActionPhase::Pending
    }

    pub fn config(&self) -> &ActionConfig {
        &self.shared.config
    }
}

impl Drop for SimulatedAction {
    fn drop(&mut self) {
        if let Some(timer) = self.shared.lock().timer.take() {
            self.shared.scheduler.cancel(timer);
        }
    }
}
