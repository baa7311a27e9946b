//! Configuration for the provider client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for the [`ApigwClient`](crate::transport::ApigwClient).
///
/// Both the API key and the endpoint URL are required; [`validate`]
/// rejects a missing value before any request is attempted.
///
/// [`validate`]: ProviderConfig::validate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key sent with every request.
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the control-plane endpoint.
    #[serde(default)]
    pub endpoint: String,

    /// Timeout for individual HTTP requests.
    ///
    /// This bounds a single round trip, not a convergence wait; polling
    /// deadlines live with the resource lifecycle.
    #[serde(with = "duration_secs", default = "default_request_timeout")]
    pub request_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: String::new(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl ProviderConfig {
    /// Create a new config from an API key and endpoint URL.
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load configuration from the `APIGW_APIKEY` and `APIGW_URL`
    /// environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("APIGW_APIKEY") {
            config.api_key = key;
        }

        if let Ok(url) = std::env::var("APIGW_URL") {
            config.endpoint = url;
        }

        config
    }

    /// Load configuration from a file (JSON or TOML by extension).
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        if path.extension().is_some_and(|e| e == "json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            toml::from_str(&content)
                .map_err(|e| Error::config(format!("failed to parse config: {e}")))
        }
    }

    /// Check that the required fields are present.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::config("'APIGW_APIKEY' must be specified"));
        }

        if self.endpoint.is_empty() {
            return Err(Error::config("'APIGW_URL' must be specified"));
        }

        Ok(())
    }
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Serialization helper for Duration as seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validate_requires_api_key() {
        let config = ProviderConfig::new("", "https://api.example.com");
        let err = config.validate().err().map(|e| e.to_string());
        assert!(err.is_some_and(|m| m.contains("APIGW_APIKEY")));
    }

    #[test]
    fn test_validate_requires_endpoint() {
        let config = ProviderConfig::new("key", "");
        let err = config.validate().err().map(|e| e.to_string());
        assert!(err.is_some_and(|m| m.contains("APIGW_URL")));
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        let config = ProviderConfig::new("key", "https://api.example.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_toml() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "api_key = \"k1\"\nendpoint = \"https://api.example.com\"")?;

        let config = ProviderConfig::from_file(file.path())?;
        assert_eq!(config.api_key, "k1");
        assert_eq!(config.endpoint, "https://api.example.com");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        Ok(())
    }

    #[test]
    fn test_from_file_json() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
        writeln!(
            file,
            "{{\"api_key\": \"k2\", \"endpoint\": \"https://api.example.com\", \"request_timeout\": 10}}"
        )?;

        let config = ProviderConfig::from_file(file.path())?;
        assert_eq!(config.api_key, "k2");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        Ok(())
    }
}
