use async_trait::async_trait;

use super::GenerationAdapter;

/// The concept returned by every offline generation.
pub const OFFLINE_CONCEPT: &str = "API Key not configured. Simulating response: A futuristic fusion of organic geometry and industrial raw materials, featuring glowing accents in teal and magenta.";

/// Adapter used when no credential is configured.
///
/// Resolves immediately; callers simulate latency themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineAdapter;

#[async_trait]
impl GenerationAdapter for OfflineAdapter {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn generate(&self, _prompt: &str) -> String {
        OFFLINE_CONCEPT.to_string()
    }
}
