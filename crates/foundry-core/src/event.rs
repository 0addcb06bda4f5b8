//! State-change events consumed by the presentation layer.

use serde::{Deserialize, Serialize};

use crate::modal::ModalSnapshot;
use crate::notifications::Notification;
use crate::sequencer::{ActionSnapshot, InteractionSnapshot};

/// Unified event type published on the [`EventBus`](crate::event_bus::EventBus).
///
/// Each variant carries the full state a renderer needs, so subscribers never
/// have to query back into the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum UiEvent {
    /// The interaction sequencer changed phase or revealed a character.
    SequencerChanged { snapshot: InteractionSnapshot },

    /// A simulated action (sign-in, save-profile) changed phase.
    ActionChanged { snapshot: ActionSnapshot },

    /// The set of visible notifications changed.
    NotificationsChanged { active: Vec<Notification> },

    /// A modal opened or closed.
    ModalChanged { snapshot: ModalSnapshot },
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SequencerChanged { .. } => "sequencerChanged",
            Self::ActionChanged { .. } => "actionChanged",
            Self::NotificationsChanged { .. } => "notificationsChanged",
            Self::ModalChanged { .. } => "modalChanged",
        }
    }
}
