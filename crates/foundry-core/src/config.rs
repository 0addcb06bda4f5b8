//! Startup configuration.
//!
//! The only functional switch is whether a generation credential is present,
//! which selects the live or offline adapter. Everything else is tuning.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Model used by the live generation adapter.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Base URL of the generation REST API.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables consulted for the credential, in order.
const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];
const MODEL_VAR: &str = "FOUNDRY_MODEL";
const ENDPOINT_VAR: &str = "FOUNDRY_ENDPOINT";
const TRANSCRIPT_DIR_VAR: &str = "FOUNDRY_TRANSCRIPT_DIR";

/// Fixed delays used by the orchestrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Delay between two reveal ticks of the typing phase.
    pub char_interval: Duration,
    /// Simulated processing time between typing and the result.
    pub processing_delay: Duration,
    /// How long a notification stays visible.
    pub notification_ttl: Duration,
    pub sign_in_latency: Duration,
    pub save_profile_latency: Duration,
    /// Upper bound for one live generation request.
    pub request_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            char_interval: Duration::from_millis(30),
            processing_delay: Duration::from_millis(1500),
            notification_ttl: Duration::from_millis(5000),
            sign_in_latency: Duration::from_millis(1500),
            save_profile_latency: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone)]
pub struct FoundryConfig {
    /// Generation credential. `None` selects the offline adapter.
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    /// Directory for generation transcripts, if enabled.
    pub transcript_dir: Option<PathBuf>,
    pub timing: Timing,
}

impl FoundryConfig {
    /// Configuration without a credential.
    pub fn offline() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            transcript_dir: None,
            timing: Timing::default(),
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::offline();
        config.api_key = API_KEY_VARS.iter().find_map(|&name| read(name));
        if let Some(model) = read(MODEL_VAR) {
            config.model = model;
        }
        if let Some(endpoint) = read(ENDPOINT_VAR) {
            config.endpoint = endpoint;
        }
        config.transcript_dir = read(TRANSCRIPT_DIR_VAR).map(PathBuf::from);
        config
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for FoundryConfig {
    fn default() -> Self {
        Self::offline()
    }
}

// The credential never shows up in logs.
impl fmt::Debug for FoundryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoundryConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("transcript_dir", &self.transcript_dir)
            .field("timing", &self.timing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    mod timing {
        use super::*;

        #[test]
        fn defaults_match_product_constants() {
            let timing = Timing::default();
            assert_eq!(timing.char_interval, Duration::from_millis(30));
            assert_eq!(timing.processing_delay, Duration::from_millis(1500));
            assert_eq!(timing.notification_ttl, Duration::from_millis(5000));
            assert_eq!(timing.sign_in_latency, Duration::from_millis(1500));
            assert_eq!(timing.save_profile_latency, Duration::from_millis(1000));
        }
    }

    mod from_lookup {
        use super::*;

        #[test]
        fn empty_environment_is_offline() {
            let config = FoundryConfig::from_lookup(lookup_from(&[]));
            assert!(!config.has_credential());
            assert_eq!(config.model, DEFAULT_MODEL);
            assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
            assert!(config.transcript_dir.is_none());
        }

        #[test]
        fn api_key_enables_credential() {
            let config = FoundryConfig::from_lookup(lookup_from(&[("API_KEY", "secret")]));
            assert_eq!(config.api_key.as_deref(), Some("secret"));
        }

        #[test]
        fn gemini_api_key_is_fallback() {
            let config = FoundryConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "g")]));
            assert_eq!(config.api_key.as_deref(), Some("g"));
        }

        #[test]
        fn api_key_wins_over_fallback() {
            let config = FoundryConfig::from_lookup(lookup_from(&[
                ("API_KEY", "primary"),
                ("GEMINI_API_KEY", "fallback"),
            ]));
            assert_eq!(config.api_key.as_deref(), Some("primary"));
        }

        #[test]
        fn blank_api_key_is_absent() {
            let config = FoundryConfig::from_lookup(lookup_from(&[("API_KEY", "   ")]));
            assert!(!config.has_credential());
        }

        #[test]
        fn overrides_model_endpoint_and_transcripts() {
            let config = FoundryConfig::from_lookup(lookup_from(&[
                ("FOUNDRY_MODEL", "other-model"),
                ("FOUNDRY_ENDPOINT", "http://localhost:8080"),
                ("FOUNDRY_TRANSCRIPT_DIR", "/tmp/transcripts"),
            ]));
            assert_eq!(config.model, "other-model");
            assert_eq!(config.endpoint, "http://localhost:8080");
            assert_eq!(config.transcript_dir, Some(PathBuf::from("/tmp/transcripts")));
        }
    }

    mod from_env {
        use super::*;

        #[test]
        fn reads_process_environment() {
            let _guard = ENV_LOCK.lock().unwrap();
            let prev = env::var("API_KEY").ok();

            env::set_var("API_KEY", "from-env");
            let config = FoundryConfig::from_env();
            assert_eq!(config.api_key.as_deref(), Some("from-env"));

            match prev {
                Some(value) => env::set_var("API_KEY", value),
                None => env::remove_var("API_KEY"),
            }
        }
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = FoundryConfig::offline();
        config.api_key = Some("super-secret".to_string());
        let debug = format!("{:?}", config);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("super-secret"));
    }
}
