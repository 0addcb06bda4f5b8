//! Modal visibility as scoped ownership of the UI-blocking resource.
//!
//! While a modal is visible the page scroll is locked and the Escape key is
//! captured. Holding that resource is modelled as holding a [`BlockerGuard`]:
//! it is acquired when the modal opens and released when the guard drops, so
//! every exit path (close button, backdrop click, Escape, unmount) releases it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::event::UiEvent;
use crate::event_bus::EventBus;

/// Key name (as reported by the presentation layer) that dismisses a modal.
pub const ESCAPE_KEY: &str = "Escape";

/// Counts holders of the UI-blocking resource.
#[derive(Debug, Clone, Default)]
pub struct UiBlocker {
    holders: Arc<AtomicUsize>,
}

impl UiBlocker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> BlockerGuard {
        self.holders.fetch_add(1, Ordering::SeqCst);
        BlockerGuard {
            holders: Arc::clone(&self.holders),
        }
    }

    /// Whether anything currently holds the resource.
    pub fn is_blocked(&self) -> bool {
        self.holders() > 0
    }

    pub fn holders(&self) -> usize {
        self.holders.load(Ordering::SeqCst)
    }
}

/// Releases its hold on the [`UiBlocker`] when dropped.
#[derive(Debug)]
pub struct BlockerGuard {
    holders: Arc<AtomicUsize>,
}

impl Drop for BlockerGuard {
    fn drop(&mut self) {
        self.holders.fetch_sub(1, Ordering::SeqCst);
    }
}

/// How a modal was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CloseReason {
    Button,
    Backdrop,
    Escape,
    Unmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalSnapshot {
    pub open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Number of holders of the UI-blocking resource, this modal included.
    pub blockers: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_by: Option<CloseReason>,
}

#[derive(Default)]
struct ModalState {
    title: Option<String>,
    guard: Option<BlockerGuard>,
    closed_by: Option<CloseReason>,
}

/// Open/close state of a single modal.
pub struct ModalController {
    blocker: UiBlocker,
    events: Arc<EventBus>,
    state: Mutex<ModalState>,
}

impl ModalController {
    pub fn new(blocker: UiBlocker, events: Arc<EventBus>) -> Self {
        Self {
            blocker,
            events,
            state: Mutex::new(ModalState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ModalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot_of(&self, state: &ModalState) -> ModalSnapshot {
        ModalSnapshot {
            open: state.guard.is_some(),
            title: state.title.clone(),
            blockers: self.blocker.holders(),
            closed_by: state.closed_by,
        }
    }

    /// Show the modal. Returns false if it was already open.
    pub fn open(&self, title: impl Into<String>) -> bool {
        let snapshot = {
            let mut state = self.lock();
            if state.guard.is_some() {
                return false;
            }
            state.guard = Some(self.blocker.acquire());
            state.title = Some(title.into());
            state.closed_by = None;
            self.snapshot_of(&state)
        };
        self.events.emit(UiEvent::ModalChanged { snapshot });
        true
    }

    /// Hide the modal. Returns false if it was not open.
    pub fn close(&self, reason: CloseReason) -> bool {
        let snapshot = {
            let mut state = self.lock();
            let Some(guard) = state.guard.take() else {
                return false;
            };
            drop(guard);
            state.closed_by = Some(reason);
            self.snapshot_of(&state)
        };
        log::debug!("Modal closed via {:?}", reason);
        self.events.emit(UiEvent::ModalChanged { snapshot });
        true
    }

    /// Route a key press. Escape closes an open modal.
    pub fn handle_key(&self, key: &str) -> bool {
        key == ESCAPE_KEY && self.close(CloseReason::Escape)
    }

    pub fn is_open(&self) -> bool {
        self.lock().guard.is_some()
    }

    pub fn snapshot(&self) -> ModalSnapshot {
        let state = self.lock();
        self.snapshot_of(&state)
    }
}

impl Drop for ModalController {
    fn drop(&mut self) {
        self.close(CloseReason::Unmount);
    }
}
