//! Adapter configuration.
//!
//! Defaults carry the production values. A JSON file may override any
//! subset of fields, and the environment overrides both.

use crate::error::{AdapterError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BIDDER_CODE: &str = "example";
pub const DEFAULT_ENDPOINT_URL: &str = "http://www.superssp.com:1234/api/v1";
pub const DEFAULT_IFRAME_SYNC_URL: &str = "//acdn.adnxs.com/ib/static/usersync/v3/async_usersync.html?";

pub const ENV_ENDPOINT_URL: &str = "SSSP_ENDPOINT_URL";
pub const ENV_IFRAME_SYNC_URL: &str = "SSSP_IFRAME_SYNC_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Code the host registers this bidder under
    #[serde(default = "default_bidder_code")]
    pub bidder_code: String,
    /// Endpoint every bid request is POSTed to
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,
    /// Vendor iframe sync URL; the consent fragment is appended verbatim
    #[serde(default = "default_iframe_sync_url")]
    pub iframe_sync_url: String,
}

fn default_bidder_code() -> String {
    DEFAULT_BIDDER_CODE.into()
}
fn default_endpoint_url() -> String {
    DEFAULT_ENDPOINT_URL.into()
}
fn default_iframe_sync_url() -> String {
    DEFAULT_IFRAME_SYNC_URL.into()
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            bidder_code: default_bidder_code(),
            endpoint_url: default_endpoint_url(),
            iframe_sync_url: default_iframe_sync_url(),
        }
    }
}

impl AdapterConfig {
    /// Parse a JSON config document; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Apply environment overrides on top of `self`.
    pub fn with_env(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup(ENV_ENDPOINT_URL) {
            self.endpoint_url = url;
        }
        if let Some(url) = lookup(ENV_IFRAME_SYNC_URL) {
            self.iframe_sync_url = url;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bidder_code.trim().is_empty() {
            return Err(AdapterError::Config("bidder_code must not be empty".into()));
        }
        if self.endpoint_url.trim().is_empty() {
            return Err(AdapterError::Config("endpoint_url must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_production() {
        let cfg = AdapterConfig::default();
        assert_eq!(cfg.bidder_code, "example");
        assert_eq!(cfg.endpoint_url, "http://www.superssp.com:1234/api/v1");
        assert!(cfg.iframe_sync_url.ends_with("async_usersync.html?"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = AdapterConfig::from_json(r#"{"endpoint_url": "http://localhost:9000/bid"}"#).unwrap();
        assert_eq!(cfg.endpoint_url, "http://localhost:9000/bid");
        assert_eq!(cfg.bidder_code, DEFAULT_BIDDER_CODE);
        assert_eq!(cfg.iframe_sync_url, DEFAULT_IFRAME_SYNC_URL);
    }

    #[test]
    fn empty_endpoint_rejected() {
        let err = AdapterConfig::from_json(r#"{"endpoint_url": "  "}"#).unwrap_err();
        assert!(matches!(err, AdapterError::Config(_)));
    }

    #[test]
    fn malformed_json_is_serde_error() {
        let err = AdapterConfig::from_json("{nope").unwrap_err();
        assert!(matches!(err, AdapterError::Serde(_)));
    }

    #[test]
    fn overrides_replace_urls() {
        let env: HashMap<&str, &str> = [
            (ENV_ENDPOINT_URL, "http://staging.superssp.com/api/v1"),
            (ENV_IFRAME_SYNC_URL, "//sync.example.com/i?"),
        ]
        .into_iter()
        .collect();
        let cfg = AdapterConfig::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(cfg.endpoint_url, "http://staging.superssp.com/api/v1");
        assert_eq!(cfg.iframe_sync_url, "//sync.example.com/i?");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AdapterConfig::from_file("/nonexistent/sssp.json").unwrap_err();
        assert!(matches!(err, AdapterError::Io(_)));
    }
}
