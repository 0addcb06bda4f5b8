//! Text generation behind a swappable adapter.
//!
//! The adapter is chosen once, at startup, from the configuration: a live
//! adapter when a credential is present, the offline adapter otherwise.
//! `generate` never fails; every failure resolves to displayable text.

mod live;
mod offline;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::FoundryConfig;

pub use live::{GenerationError, LiveAdapter};
pub use offline::{OfflineAdapter, OFFLINE_CONCEPT};

/// Returned when the service answered without any text.
pub const EMPTY_RESPONSE: &str = "No concept generated.";

/// Returned when the service could not be reached or answered garbage.
pub const FAILURE_RESPONSE: &str = "Error connecting to the Foundry core. Please try again.";

const INSTRUCTION_PREAMBLE: &str = "You are the creative AI assistant for 'Aurora Foundry', a futuristic design studio. Generate a short, evocative concept description (max 50 words) based on this input: ";

/// Capability that turns a prompt into result text.
#[async_trait]
pub trait GenerationAdapter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &str) -> String;
}

/// Wrap a user prompt in the studio's instruction template.
pub fn build_instruction(prompt: &str) -> String {
    format!("{}{}", INSTRUCTION_PREAMBLE, prompt)
}

/// Pick the adapter for this configuration.
pub fn select_adapter(config: &FoundryConfig) -> Arc<dyn GenerationAdapter> {
    match &config.api_key {
        Some(api_key) => {
            log::info!("Using live generation with model {}", config.model);
            Arc::new(LiveAdapter::new(api_key.clone(), config))
        }
        None => {
            log::info!("No generation credential configured, using offline concepts");
            Arc::new(OfflineAdapter)
        }
    }
}
