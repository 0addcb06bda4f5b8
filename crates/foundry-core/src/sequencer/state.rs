//! Session state shared by the sequencers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one `start()` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractionId(pub String);

impl InteractionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for InteractionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InteractionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counter invalidating callbacks scheduled for an earlier session.
///
/// Every scheduled callback captures the generation current at schedule
/// time and does nothing once it no longer matches.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Phase of the interaction sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    /// The prompt is being revealed one character per tick.
    Typing,
    /// Fully revealed; waiting for the processing delay and the adapter.
    Pending,
    Result,
    Error,
}

impl Phase {
    /// Terminal phases accept nothing but a new `start()`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Result | Self::Error)
    }

    /// Whether timers may still move this session forward.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Typing | Self::Pending)
    }
}

/// Read-only view of the current interaction session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionSnapshot {
    /// `None` while idle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<InteractionId>,
    pub phase: Phase,
    pub source_prompt: String,
    /// Revealed characters (not bytes) of `source_prompt`.
    pub revealed_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub generation: Generation,
}

impl InteractionSnapshot {
    pub fn idle(generation: Generation) -> Self {
        Self {
            id: None,
            phase: Phase::Idle,
            source_prompt: String::new(),
            revealed_length: 0,
            result_payload: None,
            error: None,
            generation,
        }
    }

    /// Length of the prompt in characters.
    pub fn prompt_length(&self) -> usize {
        self.source_prompt.chars().count()
    }

    /// The part of the prompt revealed so far.
    pub fn revealed_text(&self) -> &str {
        match self.source_prompt.char_indices().nth(self.revealed_length) {
            Some((end, _)) => &self.source_prompt[..end],
            None => &self.source_prompt,
        }
    }
}
