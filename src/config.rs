//! # Configuration Module
//!
//! Endpoints, credentials and timeouts for the two remote collaborators, plus
//! the check policy used by the pipeline. Values come from the environment
//! (`Config::from_env`) or a builder, and the CLI overrides individual fields.
//!
//! API keys are not validated here. A missing or wrong key shows up as a
//! failure of the collaborator call that uses it.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::pipeline::CheckPolicy;

/// Default endpoint of the page fetch service
pub const DEFAULT_FETCH_ENDPOINT: &str = "https://app.scrapingbee.com/api/v1/";

/// Default endpoint of the threat lookup service
pub const DEFAULT_THREAT_ENDPOINT: &str =
    "https://safebrowsing.googleapis.com/v4/threatMatches:find";

/// Default timeout for each outbound call in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_FETCH_API_KEY: &str = "LINKSCOUT_FETCH_API_KEY";
const ENV_THREAT_API_KEY: &str = "LINKSCOUT_SAFE_BROWSING_API_KEY";
const ENV_FETCH_ENDPOINT: &str = "LINKSCOUT_FETCH_ENDPOINT";
const ENV_THREAT_ENDPOINT: &str = "LINKSCOUT_THREAT_ENDPOINT";
const ENV_TIMEOUT_SECS: &str = "LINKSCOUT_TIMEOUT_SECS";

/// Configuration for a pipeline and its collaborators
#[derive(Clone)]
pub struct Config {
    /// Fetch service endpoint, queried with `api_key` and `url` parameters
    pub fetch_endpoint: String,

    /// Fetch service API key
    pub fetch_api_key: String,

    /// Threat service endpoint, queried with a `key` parameter
    pub threat_endpoint: String,

    /// Threat service API key
    pub threat_api_key: String,

    /// Client id reported to the threat service
    pub client_id: String,

    /// Client version reported to the threat service
    pub client_version: String,

    /// Timeout applied to each outbound call
    pub timeout_secs: u64,

    /// User agent sent to both collaborators
    pub user_agent: String,

    /// Whether a blocked fetch still triggers the threat lookup
    pub check_policy: CheckPolicy,
}

// Keys stay out of debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("fetch_endpoint", &self.fetch_endpoint)
            .field("fetch_api_key", &redact(&self.fetch_api_key))
            .field("threat_endpoint", &self.threat_endpoint)
            .field("threat_api_key", &redact(&self.threat_api_key))
            .field("client_id", &self.client_id)
            .field("client_version", &self.client_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("check_policy", &self.check_policy)
            .finish()
    }
}

fn redact(key: &str) -> &'static str {
    if key.is_empty() { "<unset>" } else { "<redacted>" }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch_endpoint: DEFAULT_FETCH_ENDPOINT.to_string(),
            fetch_api_key: String::new(),
            threat_endpoint: DEFAULT_THREAT_ENDPOINT.to_string(),
            threat_api_key: String::new(),
            client_id: "myapp".to_string(),
            client_version: "1.0.0".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("linkscout/{}", env!("CARGO_PKG_VERSION")),
            check_policy: CheckPolicy::default(),
        }
    }
}

impl Config {
    /// Create a new builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Load configuration from environment variables.
    ///
    /// - `LINKSCOUT_FETCH_API_KEY`: fetch service key (default: empty)
    /// - `LINKSCOUT_SAFE_BROWSING_API_KEY`: threat service key (default: empty)
    /// - `LINKSCOUT_FETCH_ENDPOINT`: fetch service URL
    /// - `LINKSCOUT_THREAT_ENDPOINT`: threat service URL
    /// - `LINKSCOUT_TIMEOUT_SECS`: per-call timeout
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(key) = lookup(ENV_FETCH_API_KEY) {
            config.fetch_api_key = key;
        }
        if let Some(key) = lookup(ENV_THREAT_API_KEY) {
            config.threat_api_key = key;
        }
        if let Some(endpoint) = lookup(ENV_FETCH_ENDPOINT) {
            config.fetch_endpoint = endpoint;
        }
        if let Some(endpoint) = lookup(ENV_THREAT_ENDPOINT) {
            config.threat_endpoint = endpoint;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                Error::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number, got '{raw}'"))
            })?;
        }

        tracing::debug!(
            fetch_endpoint = %config.fetch_endpoint,
            threat_endpoint = %config.threat_endpoint,
            timeout_secs = config.timeout_secs,
            fetch_key_set = !config.fetch_api_key.is_empty(),
            threat_key_set = !config.threat_api_key.is_empty(),
            "configuration loaded"
        );

        Ok(config)
    }

    /// Get the per-call timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Builder for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Set the fetch service endpoint
    pub fn fetch_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.fetch_endpoint = endpoint.into();
        self
    }

    /// Set the fetch service API key
    pub fn fetch_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.fetch_api_key = key.into();
        self
    }

    /// Set the threat service endpoint
    pub fn threat_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.threat_endpoint = endpoint.into();
        self
    }

    /// Set the threat service API key
    pub fn threat_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.threat_api_key = key.into();
        self
    }

    /// Set the client id and version reported to the threat service
    pub fn client(mut self, id: impl Into<String>, version: impl Into<String>) -> Self {
        self.config.client_id = id.into();
        self.config.client_version = version.into();
        self
    }

    /// Set the per-call timeout in seconds
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the check policy
    pub fn check_policy(mut self, policy: CheckPolicy) -> Self {
        self.config.check_policy = policy;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.fetch_endpoint, DEFAULT_FETCH_ENDPOINT);
        assert_eq!(config.threat_endpoint, DEFAULT_THREAT_ENDPOINT);
        assert_eq!(config.client_id, "myapp");
        assert_eq!(config.client_version, "1.0.0");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.check_policy, CheckPolicy::Eager);
    }

    #[test]
    fn test_missing_keys_are_not_an_error() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.fetch_api_key.is_empty());
        assert!(config.threat_api_key.is_empty());
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let config = Config::from_lookup(lookup_from(&[
            ("LINKSCOUT_FETCH_API_KEY", "fetch-key"),
            ("LINKSCOUT_SAFE_BROWSING_API_KEY", "threat-key"),
            ("LINKSCOUT_FETCH_ENDPOINT", "http://localhost:1/fetch"),
            ("LINKSCOUT_THREAT_ENDPOINT", "http://localhost:1/threat"),
            ("LINKSCOUT_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.fetch_api_key, "fetch-key");
        assert_eq!(config.threat_api_key, "threat-key");
        assert_eq!(config.fetch_endpoint, "http://localhost:1/fetch");
        assert_eq!(config.threat_endpoint, "http://localhost:1/threat");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("LINKSCOUT_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder() {
        let config = Config::builder()
            .fetch_api_key("a")
            .threat_api_key("b")
            .client("tester", "9.9.9")
            .timeout_secs(2)
            .check_policy(CheckPolicy::ShortCircuit)
            .build();

        assert_eq!(config.fetch_api_key, "a");
        assert_eq!(config.threat_api_key, "b");
        assert_eq!(config.client_id, "tester");
        assert_eq!(config.client_version, "9.9.9");
        assert_eq!(config.timeout_secs, 2);
        assert_eq!(config.check_policy, CheckPolicy::ShortCircuit);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = Config::builder().fetch_api_key("secret-123").build();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-123"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("<unset>"));
    }
}
