//! # foundry-core
//!
//! Interaction core for Aurora Foundry, the concept AI design studio.
//!
//! This crate is framework-agnostic: a presentation layer (web view, terminal,
//! desktop shell) subscribes to its events, renders the state they carry and
//! issues commands back. It owns no rendering logic.
//!
//! ## Key Concepts
//!
//! - **Sequencer**: simulates a generation as typing → pending → result
//! - **Simulated action**: a fixed-latency call such as sign-in or save-profile
//! - **Notification**: a transient message that expires on its own
//! - **Generation counter**: invalidates callbacks scheduled for a superseded
//!   session

pub mod config;
pub mod event;
pub mod event_bus;
pub mod generation;
pub mod modal;
pub mod notifications;
pub mod scheduler;
pub mod sequencer;
pub mod studio;
pub mod transcript;

// Re-export commonly used types
pub use config::{FoundryConfig, Timing};
pub use event::UiEvent;
pub use notifications::{Notification, NotificationId, NotificationKind, NotificationQueue};
pub use sequencer::{DemoPreset, InteractionSequencer, InteractionSnapshot, Phase};
pub use studio::Studio;
