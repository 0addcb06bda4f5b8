use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use super::types::{Notification, NotificationId, NotificationKind};
use crate::event::UiEvent;
use crate::event_bus::EventBus;
use crate::scheduler::{TimerHandle, TimerScheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Removal {
    Dismissed,
    Expired,
}

#[derive(Default)]
struct QueueState {
    /// Visible notifications in insertion order.
    items: Vec<Notification>,
    /// Auto-dismiss timer per visible notification.
    timers: HashMap<NotificationId, TimerHandle>,
}

struct Shared {
    state: Mutex<QueueState>,
    scheduler: TimerScheduler,
    events: Arc<EventBus>,
    ttl: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove a notification. Whichever of dismissal and expiry gets here
    /// first wins; the other finds nothing and returns false.
    fn remove(&self, id: &NotificationId, removal: Removal) -> bool {
        let active = {
            let mut state = self.lock();
            let Some(position) = state.items.iter().position(|n| &n.id == id) else {
                return false;
            };
            state.items.remove(position);
            if let Some(timer) = state.timers.remove(id) {
                if removal == Removal::Dismissed {
                    self.scheduler.cancel(timer);
                }
            }
            state.items.clone()
        };

        log::debug!("Notification {} removed ({:?})", id, removal);
        self.events.emit(UiEvent::NotificationsChanged { active });
        true
    }
}

/// Ordered set of notifications, each expiring independently.
///
/// Construct one per UI session and pass it by reference (or `Arc`) to
/// whatever raises notifications. Dropping the queue cancels every pending
/// expiry timer.
pub struct NotificationQueue {
    shared: Arc<Shared>,
}

impl NotificationQueue {
    pub fn new(scheduler: TimerScheduler, events: Arc<EventBus>, ttl: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState::default()),
                scheduler,
                events,
                ttl,
            }),
        }
    }

    /// Show a notification and arm its expiry timer.
    pub fn enqueue(&self, kind: NotificationKind, message: impl Into<String>) -> NotificationId {
        let notification = Notification::new(kind, message, self.shared.ttl);
        let id = notification.id.clone();

        let active = {
            let mut state = self.shared.lock();
            state.items.push(notification);

            let weak: Weak<Shared> = Arc::downgrade(&self.shared);
            let expired = id.clone();
            let timer = self.shared.scheduler.schedule(self.shared.ttl, async move {
                if let Some(shared) = weak.upgrade() {
                    shared.remove(&expired, Removal::Expired);
                }
            });
            state.timers.insert(id.clone(), timer);
            state.items.clone()
        };

        log::debug!("Notification {} enqueued ({})", id, kind);
        self.shared.events.emit(UiEvent::NotificationsChanged { active });
        id
    }

    /// Remove a notification before it expires.
    ///
    /// Returns false if it is no longer visible.
    pub fn dismiss(&self, id: &NotificationId) -> bool {
        self.shared.remove(id, Removal::Dismissed)
    }

    /// Visible notifications in insertion order.
    pub fn active(&self) -> Vec<Notification> {
        self.shared.lock().items.clone()
    }

    pub fn get(&self, id: &NotificationId) -> Option<Notification> {
        self.shared.lock().items.iter().find(|n| &n.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.shared.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.shared.ttl
    }

    /// Remove every notification and cancel their timers.
    pub fn clear(&self) {
        let had_items = {
            let mut state = self.shared.lock();
            for (_, timer) in state.timers.drain() {
                self.shared.scheduler.cancel(timer);
            }
            let had_items = !state.items.is_empty();
            state.items.clear();
            had_items
        };

        if had_items {
            self.shared
                .events
                .emit(UiEvent::NotificationsChanged { active: Vec::new() });
        }
    }
}

impl Drop for NotificationQueue {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        for (_, timer) in state.timers.drain() {
            self.shared.scheduler.cancel(timer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast;
    use tokio::time::sleep;

    const TTL: Duration = Duration::from_millis(5000);

    fn queue() -> (NotificationQueue, TimerScheduler, broadcast::Receiver<UiEvent>) {
        let scheduler = TimerScheduler::from_current().unwrap();
        let events = Arc::new(EventBus::new());
        let rx = events.subscribe();
        (NotificationQueue::new(scheduler.clone(), events, TTL), scheduler, rx)
    }

    fn messages(queue: &NotificationQueue) -> Vec<String> {
        queue.active().into_iter().map(|n| n.message).collect()
    }

    mod enqueue {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn returns_id_of_visible_notification() {
            let (queue, _, _rx) = queue();
            let id = queue.enqueue(NotificationKind::Success, "Changes saved successfully.");

            let n = queue.get(&id).unwrap();
            assert_eq!(n.kind, NotificationKind::Success);
            assert_eq!(n.message, "Changes saved successfully.");
            assert_eq!(queue.len(), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn keeps_insertion_order() {
            let (queue, _, _rx) = queue();
            queue.enqueue(NotificationKind::Success, "Changes saved successfully.");
            queue.enqueue(NotificationKind::Error, "Connection failed. Try again.");
            queue.enqueue(NotificationKind::Info, "New update available.");

            assert_eq!(
                messages(&queue),
                vec![
                    "Changes saved successfully.",
                    "Connection failed. Try again.",
                    "New update available."
                ]
            );
        }

        #[tokio::test(start_paused = true)]
        async fn emits_active_list() {
            let (queue, _, mut rx) = queue();
            queue.enqueue(NotificationKind::Info, "hello");

            match rx.recv().await.unwrap() {
                UiEvent::NotificationsChanged { active } => {
                    assert_eq!(active.len(), 1);
                    assert_eq!(active[0].message, "hello");
                }
                other => panic!("unexpected event {:?}", other),
            }
        }

        #[tokio::test(start_paused = true)]
        async fn arms_one_timer_per_notification() {
            let (queue, scheduler, _rx) = queue();
            queue.enqueue(NotificationKind::Info, "a");
            queue.enqueue(NotificationKind::Info, "b");
            assert_eq!(scheduler.pending_count(), 2);
        }
    }

    mod expiry {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn removed_after_ttl() {
            let (queue, _, _rx) = queue();
            let id = queue.enqueue(NotificationKind::Warning, "Low battery.");

            sleep(Duration::from_millis(4990)).await;
            assert!(queue.get(&id).is_some());

            sleep(Duration::from_millis(20)).await;
            assert!(queue.get(&id).is_none());
            assert!(queue.is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn expirations_are_independent() {
            let (queue, _, _rx) = queue();
            queue.enqueue(NotificationKind::Info, "first");
            sleep(Duration::from_millis(2000)).await;
            queue.enqueue(NotificationKind::Info, "second");

            sleep(Duration::from_millis(3010)).await;
            assert_eq!(messages(&queue), vec!["second"]);

            sleep(Duration::from_millis(2000)).await;
            assert!(queue.is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn expiry_emits_event() {
            let (queue, _, mut rx) = queue();
            queue.enqueue(NotificationKind::Info, "bye");
            let _ = rx.recv().await.unwrap();

            sleep(TTL + Duration::from_millis(10)).await;
            match rx.recv().await.unwrap() {
                UiEvent::NotificationsChanged { active } => assert!(active.is_empty()),
                other => panic!("unexpected event {:?}", other),
            }
        }
    }

    mod dismiss {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn removes_immediately_and_cancels_timer() {
            let (queue, scheduler, _rx) = queue();
            let id = queue.enqueue(NotificationKind::Success, "Saved.");

            assert!(queue.dismiss(&id));
            assert!(queue.is_empty());
            assert_eq!(scheduler.pending_count(), 0);
        }

        #[tokio::test(start_paused = true)]
        async fn later_expiry_is_noop() {
            let (queue, _, mut rx) = queue();
            let id = queue.enqueue(NotificationKind::Success, "Saved.");
            queue.dismiss(&id);
            let _enqueued = rx.recv().await.unwrap();
            let _dismissed = rx.recv().await.unwrap();

            sleep(TTL * 2).await;
            assert!(queue.is_empty());
            // No second removal event.
            assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
        }

        #[tokio::test(start_paused = true)]
        async fn absent_id_is_noop() {
            let (queue, _, _rx) = queue();
            queue.enqueue(NotificationKind::Info, "kept");

            assert!(!queue.dismiss(&NotificationId("missing".to_string())));
            assert_eq!(queue.len(), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn dismiss_twice_is_noop() {
            let (queue, _, _rx) = queue();
            let id = queue.enqueue(NotificationKind::Info, "once");

            assert!(queue.dismiss(&id));
            assert!(!queue.dismiss(&id));
        }

        #[tokio::test(start_paused = true)]
        async fn dismiss_after_expiry_is_noop() {
            let (queue, _, _rx) = queue();
            let id = queue.enqueue(NotificationKind::Info, "gone");

            sleep(TTL + Duration::from_millis(10)).await;
            assert!(!queue.dismiss(&id));
        }

        #[tokio::test(start_paused = true)]
        async fn dismissing_first_leaves_second_untouched() {
            let (queue, _, _rx) = queue();
            let first = queue.enqueue(NotificationKind::Success, "Changes saved successfully.");
            let second = queue.enqueue(NotificationKind::Error, "Connection failed. Try again.");
            let second_expiry = queue.get(&second).unwrap().expires_at;

            sleep(Duration::from_millis(1000)).await;
            assert!(queue.dismiss(&first));

            let remaining = queue.active();
            assert_eq!(remaining.len(), 1);
            assert_eq!(remaining[0].id, second);
            assert_eq!(remaining[0].expires_at, second_expiry);

            // Second still expires on its own schedule.
            sleep(Duration::from_millis(3990)).await;
            assert!(queue.get(&second).is_some());
            sleep(Duration::from_millis(20)).await;
            assert!(queue.is_empty());
        }
    }

    mod teardown {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn clear_removes_everything() {
            let (queue, scheduler, _rx) = queue();
            queue.enqueue(NotificationKind::Info, "a");
            queue.enqueue(NotificationKind::Info, "b");

            queue.clear();
            assert!(queue.is_empty());
            assert_eq!(scheduler.pending_count(), 0);
        }

        #[tokio::test(start_paused = true)]
        async fn clear_on_empty_queue_emits_nothing() {
            let (queue, _, mut rx) = queue();
            queue.clear();
            assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
        }

        #[tokio::test(start_paused = true)]
        async fn drop_cancels_pending_timers() {
            let (queue, scheduler, _rx) = queue();
            queue.enqueue(NotificationKind::Info, "a");
            assert_eq!(scheduler.pending_count(), 1);

            drop(queue);
            assert_eq!(scheduler.pending_count(), 0);
        }
    }
}
