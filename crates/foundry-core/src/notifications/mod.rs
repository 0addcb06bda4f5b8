//! Transient notifications ("toasts") that expire on their own.

mod queue;
mod types;

pub use queue::NotificationQueue;
pub use types::{Glyph, Notification, NotificationId, NotificationKind};
