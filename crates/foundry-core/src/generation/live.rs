use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use super::{build_instruction, GenerationAdapter, EMPTY_RESPONSE, FAILURE_RESPONSE};
use crate::config::FoundryConfig;
use crate::transcript::Transcript;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Request to generation service failed: {0}")]
    Transport(String),

    #[error("Failed to decode generation response: {0}")]
    Decode(String),

    #[error("Generation worker stopped: {0}")]
    Worker(String),
}

/// Adapter backed by the Gemini `generateContent` endpoint.
///
/// The HTTP call is blocking and runs on tokio's blocking pool, so awaiting
/// it never stalls the event loop.
pub struct LiveAdapter {
    agent: ureq::Agent,
    api_key: String,
    url: String,
    transcript: Arc<Transcript>,
}

impl LiveAdapter {
    pub fn new(api_key: String, config: &FoundryConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timing.request_timeout)
            .build();
        let url = format!(
            "{}/models/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model
        );
        let transcript = Transcript::open(config.transcript_dir.as_deref(), "generation");

        Self {
            agent,
            api_key,
            url,
            transcript: Arc::new(transcript),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, instruction: String) -> Result<Option<String>, GenerationError> {
        let agent = self.agent.clone();
        let url = self.url.clone();
        let api_key = self.api_key.clone();

        tokio::task::spawn_blocking(move || send_request(&agent, &url, &api_key, &instruction))
            .await
            .map_err(|e| GenerationError::Worker(e.to_string()))?
    }
}

#[async_trait]
impl GenerationAdapter for LiveAdapter {
    fn name(&self) -> &'static str {
        "live"
    }

    async fn generate(&self, prompt: &str) -> String {
        self.transcript.record("PROMPT", prompt);

        let text = match self.request(build_instruction(prompt)).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                log::warn!("Generation service returned no text");
                EMPTY_RESPONSE.to_string()
            }
            Err(e) => {
                log::error!("Generation failed: {}", e);
                self.transcript.record("ERROR", &e.to_string());
                FAILURE_RESPONSE.to_string()
            }
        };

        self.transcript.record("RESPONSE", &text);
        text
    }
}

fn send_request(
    agent: &ureq::Agent,
    url: &str,
    api_key: &str,
    instruction: &str,
) -> Result<Option<String>, GenerationError> {
    let body = json!({
        "contents": [{ "parts": [{ "text": instruction }] }]
    });

    let response = agent
        .post(url)
        .set("x-goog-api-key", api_key)
        .send_json(body)
        .map_err(|e| GenerationError::Transport(e.to_string()))?;

    let value: Value = response
        .into_json()
        .map_err(|e| GenerationError::Decode(e.to_string()))?;

    Ok(extract_text(&value))
}

/// Concatenate the text parts of the first candidate.
///
/// Returns `None` when the response carries no text at all.
fn extract_text(response: &Value) -> Option<String> {
    let parts = response
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
