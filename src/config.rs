//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the coaching API, without the `/api` suffix.
    pub api_base_url: String,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
    /// Debounce interval held between steps of a flow.
    pub transition_delay: Duration,
    /// File the session token is persisted to.
    pub token_path: PathBuf,
    /// Origin the application is served from, for redirect checks.
    pub app_origin: Option<String>,
    /// Extra hosts external redirects may target.
    pub allowed_redirect_hosts: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8001".to_string(),
            request_timeout: Duration::from_secs(30),
            transition_delay: Duration::from_millis(300),
            token_path: default_token_path(),
            app_origin: None,
            allowed_redirect_hosts: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from `COACH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("COACH_API_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup("COACH_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(parse_number("COACH_REQUEST_TIMEOUT_SECS", &secs)?);
        }
        if let Some(ms) = lookup("COACH_TRANSITION_MS") {
            config.transition_delay = Duration::from_millis(parse_number("COACH_TRANSITION_MS", &ms)?);
        }
        if let Some(path) = lookup("COACH_TOKEN_PATH") {
            config.token_path = PathBuf::from(path);
        }
        config.app_origin = lookup("COACH_APP_ORIGIN").filter(|s| !s.trim().is_empty());
        if let Some(hosts) = lookup("COACH_REDIRECT_HOSTS") {
            config.allowed_redirect_hosts = hosts
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(config)
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{raw:?} is not a non-negative integer ({e})"),
    })
}

fn default_token_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".coach-client/token")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8001");
        assert_eq!(config.transition_delay, Duration::from_millis(300));
        assert!(config.token_path.ends_with(".coach-client/token"));
        assert!(config.allowed_redirect_hosts.is_empty());
    }

    #[test]
    fn reads_overrides() {
        let env = vars(&[
            ("COACH_API_URL", "https://api.example.com/"),
            ("COACH_TRANSITION_MS", "0"),
            ("COACH_REQUEST_TIMEOUT_SECS", "5"),
            ("COACH_REDIRECT_HOSTS", "checkout.stripe.com, Billing.Example.com,,"),
        ]);
        let config = ClientConfig::from_lookup(|key| env.get(key).cloned()).unwrap();

        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.transition_delay, Duration::ZERO);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(
            config.allowed_redirect_hosts,
            vec!["checkout.stripe.com", "billing.example.com"]
        );
    }

    #[test]
    fn rejects_non_numeric_delay() {
        let env = vars(&[("COACH_TRANSITION_MS", "fast")]);
        let err = ClientConfig::from_lookup(|key| env.get(key).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "COACH_TRANSITION_MS"));
    }
}
