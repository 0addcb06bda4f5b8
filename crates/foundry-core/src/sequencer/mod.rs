//! Timed interaction orchestrators.
//!
//! Both sequencers follow the same rule: every scheduled callback carries the
//! generation it was scheduled under, and a callback whose generation is no
//! longer current does nothing.

mod interaction;
mod presets;
mod simulated;
mod state;

pub use interaction::{InteractionSequencer, EMPTY_PROMPT};
pub use presets::DemoPreset;
pub use simulated::{ActionConfig, ActionPhase, ActionSnapshot, Completion, SimulatedAction};
pub use state::{Generation, InteractionId, InteractionSnapshot, Phase};
