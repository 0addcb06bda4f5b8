//! The typing → pending → result sequencer behind the concept generator.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use super::presets::DemoPreset;
use super::state::{Generation, InteractionId, InteractionSnapshot, Phase};
use crate::config::Timing;
use crate::event::UiEvent;
use crate::event_bus::EventBus;
use crate::generation::GenerationAdapter;
use crate::scheduler::{TimerHandle, TimerScheduler};

/// Error shown when `start()` receives a blank prompt.
pub const EMPTY_PROMPT: &str = "Prompt is empty.";

struct SequencerState {
    session: InteractionSnapshot,
    prompt_length: usize,
    /// The one timer that will move the session forward, if any.
    timer: Option<TimerHandle>,
}

struct Shared {
    state: Mutex<SequencerState>,
    scheduler: TimerScheduler,
    adapter: Arc<dyn GenerationAdapter>,
    events: Arc<EventBus>,
    char_interval: Duration,
    processing_delay: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SequencerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, snapshot: InteractionSnapshot) {
        self.events.emit(UiEvent::SequencerChanged { snapshot });
    }

    fn schedule_tick(shared: &Arc<Shared>, generation: Generation) -> TimerHandle {
        let weak = Arc::downgrade(shared);
        shared.scheduler.schedule(shared.char_interval, async move {
            if let Some(shared) = weak.upgrade() {
                Shared::on_tick(&shared, generation);
            }
        })
    }

    fn on_tick(shared: &Arc<Shared>, generation: Generation) {
        let snapshot = {
            let mut state = shared.lock();
            if state.session.generation != generation || state.session.phase != Phase::Typing {
                log::debug!("Dropping reveal tick from stale generation {}", generation.value());
                return;
            }

            state.session.revealed_length += 1;
            let next = if state.session.revealed_length >= state.prompt_length {
                state.session.phase = Phase::Pending;
                Shared::schedule_processing(shared, generation)
            } else {
                Shared::schedule_tick(shared, generation)
            };
            state.timer = Some(next);
            state.session.clone()
        };
        shared.publish(snapshot);
    }

    fn schedule_processing(shared: &Arc<Shared>, generation: Generation) -> TimerHandle {
        let weak = Arc::downgrade(shared);
        shared
            .scheduler
            .schedule(shared.processing_delay, Shared::process(weak, generation))
    }

    /// Processing timer body: ask the adapter, then deliver unless stale.
    async fn process(weak: Weak<Shared>, generation: Generation) {
        let (adapter, prompt) = {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let mut state = shared.lock();
            if state.session.generation != generation || state.session.phase != Phase::Pending {
                return;
            }
            state.timer = None;
            (Arc::clone(&shared.adapter), state.session.source_prompt.clone())
        };

        log::debug!("Generating with {} adapter", adapter.name());
        let text = adapter.generate(&prompt).await;

        if let Some(shared) = weak.upgrade() {
            Shared::on_generated(&shared, generation, text);
        }
    }

    fn on_generated(shared: &Arc<Shared>, generation: Generation, text: String) {
        let snapshot = {
            let mut state = shared.lock();
            if state.session.generation != generation || state.session.phase != Phase::Pending {
                log::debug!(
                    "Discarding generation result from stale generation {}",
                    generation.value()
                );
                return;
            }
            state.session.phase = Phase::Result;
            state.session.result_payload = Some(text);
            state.session.clone()
        };
        shared.publish(snapshot);
    }
}

/// Drives one simulated generation at a time.
///
/// `start()` always wins: it supersedes whatever session was in flight, and
/// nothing scheduled for the old session can touch the new one.
pub struct InteractionSequencer {
    shared: Arc<Shared>,
}

impl InteractionSequencer {
    pub fn new(
        scheduler: TimerScheduler,
        adapter: Arc<dyn GenerationAdapter>,
        events: Arc<EventBus>,
        timing: &Timing,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SequencerState {
                    session: InteractionSnapshot::idle(Generation::default()),
                    prompt_length: 0,
                    timer: None,
                }),
                scheduler,
                adapter,
                events,
                char_interval: timing.char_interval,
                processing_delay: timing.processing_delay,
            }),
        }
    }

    /// Begin revealing `prompt`, superseding any session in flight.
    ///
    /// A blank prompt moves straight to [`Phase::Error`].
    pub fn start(&self, prompt: impl Into<String>) -> InteractionId {
        let prompt = prompt.into();
        let id = InteractionId::new();

        let snapshot = {
            let mut state = self.shared.lock();
            if let Some(timer) = state.timer.take() {
                self.shared.scheduler.cancel(timer);
            }

            let generation = state.session.generation.next();
            let mut session = InteractionSnapshot::idle(generation);
            session.id = Some(id.clone());
            session.source_prompt = prompt;

            if session.source_prompt.trim().is_empty() {
                log::warn!("Refusing to start interaction with an empty prompt");
                session.phase = Phase::Error;
                session.error = Some(EMPTY_PROMPT.to_string());
                state.prompt_length = 0;
            } else {
                session.phase = Phase::Typing;
                state.prompt_length = session.prompt_length();
                state.timer = Some(Shared::schedule_tick(&self.shared, generation));
            }

            log::info!(
                "Interaction {} started (generation {})",
                id,
                generation.value()
            );
            state.session = session;
            state.session.clone()
        };

        self.shared.publish(snapshot);
        id
    }

    /// Start one of the canned landing-page demos.
    pub fn start_preset(&self, preset: DemoPreset) -> InteractionId {
        self.start(preset.prompt())
    }

    /// Abandon the current session and return to idle.
    ///
    /// Only a typing or pending session can be cancelled; idle and finished
    /// sessions are left untouched. A generation already in flight still
    /// completes, but its result is discarded.
    pub fn cancel(&self) {
        let snapshot = {
            let mut state = self.shared.lock();
            if !state.session.phase.is_in_flight() {
                log::debug!(
                    "Cancel ignored in {:?} (generation {})",
                    state.session.phase,
                    state.session.generation.value()
                );
                return;
            }
            if let Some(timer) = state.timer.take() {
                self.shared.scheduler.cancel(timer);
            }
            let generation = state.session.generation.next();
            state.session = InteractionSnapshot::idle(generation);
            state.prompt_length = 0;
            state.session.clone()
        };

        log::info!("Interaction cancelled (generation {})", snapshot.generation.value());
        self.shared.publish(snapshot);
    }

    pub fn snapshot(&self) -> InteractionSnapshot {
        self.shared.lock().session.clone()
    }

    pub fn phase(&self) -> Phase {
        self.shared.lock().session.phase
    }

    pub fn generation(&self) -> Generation {
        self.shared.lock().session.generation
    }

    pub fn revealed_text(&self) -> String {
        self.shared.lock().session.revealed_text().to_string()
    }

    pub fn adapter_name(&self) -> &'static str {
        self.shared.adapter.name()
    }
}

impl Drop for InteractionSequencer {
    fn drop(&mut self) {
        if let Some(timer) = self.shared.lock().timer.take() {
            self.shared.scheduler.cancel(timer);
        }
    }
}
