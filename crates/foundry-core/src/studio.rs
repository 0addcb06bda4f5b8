//! Composition root for one UI session.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::FoundryConfig;
use crate::event::UiEvent;
use crate::event_bus::EventBus;
use crate::generation::{select_adapter, GenerationAdapter};
use crate::modal::{CloseReason, ModalController, UiBlocker};
use crate::notifications::NotificationQueue;
use crate::scheduler::{SchedulerError, TimerScheduler};
use crate::sequencer::{ActionConfig, InteractionSequencer, SimulatedAction};

/// Every orchestrator of a UI session, wired to one scheduler and one bus.
///
/// The presentation layer creates a `Studio` at startup and hands out
/// references to its parts; nothing in the core is reachable globally.
pub struct Studio {
    config: FoundryConfig,
    scheduler: TimerScheduler,
    events: Arc<EventBus>,
    blocker: UiBlocker,
    notifications: Arc<NotificationQueue>,
    sequencer: InteractionSequencer,
    sign_in: SimulatedAction,
    save_profile: SimulatedAction,
    modal: ModalController,
}

impl Studio {
    /// Build a studio on the current tokio runtime, selecting the generation
    /// adapter from the configuration.
    pub fn new(config: FoundryConfig) -> Result<Self, SchedulerError> {
        let adapter = select_adapter(&config);
        Self::with_adapter(config, adapter)
    }

    /// Build a studio with an explicit generation adapter.
    pub fn with_adapter(
        config: FoundryConfig,
        adapter: Arc<dyn GenerationAdapter>,
    ) -> Result<Self, SchedulerError> {
        let scheduler = TimerScheduler::from_current()?;
        let events = Arc::new(EventBus::new());
        let timing = config.timing;

        let notifications = Arc::new(NotificationQueue::new(
            scheduler.clone(),
            Arc::clone(&events),
            timing.notification_ttl,
        ));
        let sequencer =
            InteractionSequencer::new(scheduler.clone(), adapter, Arc::clone(&events), &timing);
        let sign_in = SimulatedAction::new(
            ActionConfig::sign_in(&timing),
            scheduler.clone(),
            Arc::clone(&notifications),
            Arc::clone(&events),
        );
        let save_profile = SimulatedAction::new(
            ActionConfig::save_profile(&timing),
            scheduler.clone(),
            Arc::clone(&notifications),
            Arc::clone(&events),
        );
        let blocker = UiBlocker::new();
        let modal = ModalController::new(blocker.clone(), Arc::clone(&events));

        log::debug!("Studio ready: {:?}", config);

        Ok(Self {
            config,
            scheduler,
            events,
            blocker,
            notifications,
            sequencer,
            sign_in,
            save_profile,
            modal,
        })
    }

    pub fn config(&self) -> &FoundryConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &TimerScheduler {
        &self.scheduler
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    pub fn notifications(&self) -> &Arc<NotificationQueue> {
        &self.notifications
    }

    pub fn sequencer(&self) -> &InteractionSequencer {
        &self.sequencer
    }

    pub fn sign_in(&self) -> &SimulatedAction {
        &self.sign_in
    }

    pub fn save_profile(&self) -> &SimulatedAction {
        &self.save_profile
    }

    pub fn modal(&self) -> &ModalController {
        &self.modal
    }

    pub fn blocker(&self) -> &UiBlocker {
        &self.blocker
    }

    /// Stop everything in flight and release the UI.
    pub fn shutdown(&self) {
        self.sequencer.cancel();
        self.sign_in.cancel();
        self.save_profile.cancel();
        self.notifications.clear();
        self.modal.close(CloseReason::Unmount);
        let stray = self.scheduler.cancel_all();
        log::debug!("Studio shut down ({} stray timers cancelled)", stray);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::OFFLINE_CONCEPT;
    use crate::notifications::NotificationKind;
    use crate::sequencer::{ActionPhase, DemoPreset, Phase};
    use std::time::Duration;
    use tokio::time::sleep;

    #[test]
    fn new_requires_runtime() {
        assert!(matches!(
            Studio::new(FoundryConfig::offline()),
            Err(SchedulerError::NoRuntime)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn offline_config_selects_offline_adapter() {
        let studio = Studio::new(FoundryConfig::offline()).unwrap();
        assert_eq!(studio.sequencer().adapter_name(), "offline");
        assert!(!studio.config().has_credential());
    }

    #[tokio::test(start_paused = true)]
    async fn preset_runs_to_offline_result() {
        let studio = Studio::new(FoundryConfig::offline()).unwrap();
        studio.sequencer().start_preset(DemoPreset::Profile);

        sleep(Duration::from_millis(3400)).await;
        let snapshot = studio.sequencer().snapshot();
        assert_eq!(snapshot.phase, Phase::Result);
        assert_eq!(snapshot.result_payload.as_deref(), Some(OFFLINE_CONCEPT));
    }

    #[tokio::test(start_paused = true)]
    async fn sign_in_raises_welcome_toast() {
        let studio = Studio::new(FoundryConfig::offline()).unwrap();
        studio.sign_in().start();

        sleep(Duration::from_millis(1510)).await;
        assert_eq!(studio.sign_in().phase(), ActionPhase::Result);
        let active = studio.notifications().active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, "Welcome back, Architect.");

        sleep(Duration::from_millis(5000)).await;
        assert!(studio.notifications().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn parts_share_one_event_bus() {
        let studio = Studio::new(FoundryConfig::offline()).unwrap();
        let mut rx = studio.subscribe();

        studio.notifications().enqueue(NotificationKind::Info, "New update available.");
        studio.modal().open("Confirm Action");
        studio.sequencer().start("ab");

        let names: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|event| event.name())
            .collect();
        assert_eq!(
            names,
            vec!["notificationsChanged", "modalChanged", "sequencerChanged"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_settles_everything() {
        let studio = Studio::new(FoundryConfig::offline()).unwrap();
        studio.sequencer().start("Hello");
        studio.save_profile().start();
        studio.notifications().enqueue(NotificationKind::Error, "Connection failed. Try again.");
        studio.modal().open("Dialog");

        studio.shutdown();

        assert_eq!(studio.sequencer().phase(), Phase::Idle);
        assert_eq!(studio.save_profile().phase(), ActionPhase::Idle);
        assert!(studio.notifications().is_empty());
        assert!(!studio.blocker().is_blocked());
        assert_eq!(studio.scheduler().pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_foreign_timers() {
        let studio = Studio::new(FoundryConfig::offline()).unwrap();
        let fired = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let _timer = studio.scheduler().schedule(Duration::from_millis(100), async move {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        });

        studio.shutdown();
        assert_eq!(studio.scheduler().pending_count(), 0);

        sleep(Duration::from_millis(200)).await;
        assert!(!fired.load(std::sync::atomic::Ordering::SeqCst));
    }
}
