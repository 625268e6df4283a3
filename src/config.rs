//! Client configuration
//!
//! Defaults to the local chat server. On native targets an optional JSON file
//! (`CHAT_CONFIG`) and the `CHAT_WS` env var can override the endpoint.

use serde::Deserialize;

/// Default WebSocket endpoint of the chat server
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:8080";

/// Env var naming a JSON config file
pub const CONFIG_ENV: &str = "CHAT_CONFIG";
/// Env var overriding the endpoint (wins over the config file)
pub const ENDPOINT_ENV: &str = "CHAT_WS";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub endpoint: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Resolve config from `CHAT_CONFIG` and `CHAT_WS`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let file = std::env::var(CONFIG_ENV).ok();
        let endpoint = std::env::var(ENDPOINT_ENV).ok();
        Self::resolve(file.as_deref(), endpoint)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn resolve(
        file: Option<&str>,
        endpoint: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = match file {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| format!("failed to read {path}: {e}"))?;
                Self::from_json(&json).map_err(|e| format!("invalid config {path}: {e}"))?
            }
            None => Self::default(),
        };
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            config.endpoint = endpoint;
        }
        tracing::debug!(endpoint = %config.endpoint, "Resolved client config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_local_server() {
        assert_eq!(ClientConfig::default().endpoint, "ws://127.0.0.1:8080");
    }

    #[test]
    fn empty_json_uses_defaults() {
        let config = ClientConfig::from_json("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn json_overrides_endpoint() {
        let config = ClientConfig::from_json(r#"{"endpoint": "ws://chat.local:9000"}"#).unwrap();
        assert_eq!(config.endpoint, "ws://chat.local:9000");
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(ClientConfig::from_json(r#"{"endpoint": "ws://x", "retry": 3}"#).is_err());
    }

    #[test]
    fn env_endpoint_wins_over_file_default() {
        let config = ClientConfig::resolve(None, Some("ws://10.0.0.2:8080".into())).unwrap();
        assert_eq!(config.endpoint, "ws://10.0.0.2:8080");
    }

    #[test]
    fn blank_env_endpoint_ignored() {
        let config = ClientConfig::resolve(None, Some("  ".into())).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ClientConfig::resolve(Some("/nonexistent/chat.json"), None).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/chat.json"));
    }
}
