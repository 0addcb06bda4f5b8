//! Plain-text rendering of core events, standing in for the web UI.

use foundry_core::sequencer::{ActionPhase, Phase};
use foundry_core::UiEvent;

/// Describe an event as a single status line.
///
/// Intermediate typing ticks return `None`; only the first and last
/// characters of a reveal are worth a line.
pub fn describe(event: &UiEvent) -> Option<String> {
    match event {
        UiEvent::SequencerChanged { snapshot } => match snapshot.phase {
            Phase::Idle => Some("generator: idle".to_string()),
            Phase::Typing if snapshot.revealed_length == 0 => {
                Some(format!("generator: typing \"{}\"", snapshot.source_prompt))
            }
            Phase::Typing => None,
            Phase::Pending => Some("generator: Connecting to neural core...".to_string()),
            Phase::Result => Some(format!(
                "generator: {}",
                snapshot.result_payload.as_deref().unwrap_or_default()
            )),
            Phase::Error => Some(format!(
                "generator failed: {}",
                snapshot.error.as_deref().unwrap_or_default()
            )),
        },
        UiEvent::ActionChanged { snapshot } => {
            let status = match snapshot.phase {
                ActionPhase::Idle => "idle",
                ActionPhase::Pending => "working...",
                ActionPhase::Result => "done",
            };
            Some(format!("{}: {}", snapshot.action, status))
        }
        UiEvent::NotificationsChanged { active } => {
            if active.is_empty() {
                return Some("toasts: none".to_string());
            }
            let lines: Vec<String> = active
                .iter()
                .map(|n| format!("[{}] {}", n.kind, n.message))
                .collect();
            Some(format!("toasts: {}", lines.join(" | ")))
        }
        UiEvent::ModalChanged { snapshot } => Some(if snapshot.open {
            format!(
                "modal open: {}",
                snapshot.title.as_deref().unwrap_or_default()
            )
        } else {
            "modal closed".to_string()
        }),
    }
}

/// Whether a flow has reached a state it will not leave on its own.
pub fn is_settled(event: &UiEvent) -> bool {
    match event {
        UiEvent::SequencerChanged { snapshot } => {
            snapshot.phase.is_terminal() || snapshot.phase == Phase::Idle
        }
        UiEvent::ActionChanged { snapshot } => snapshot.phase != ActionPhase::Pending,
        UiEvent::NotificationsChanged { .. } | UiEvent::ModalChanged { .. } => false,
    }
}
