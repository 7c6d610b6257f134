//! Engine configuration
//!
//! Settings are supplied as a single JSON document keyed by environment name:
//!
//! ```json
//! {
//!   "production": {
//!     "base_url": "https://example.cybozu.com/k/v1/records.json",
//!     "configs": {
//!       "orders": { "app_no": "12", "apitoken": "...", "query": "status = \"open\"" }
//!     }
//!   }
//! }
//! ```
//!
//! Each named entry under `configs` is one data-source. Source order in the
//! document is the order sources are fetched and published.

use crate::client::REMOTE_PAGE_SIZE_CAP;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Environment selected when the caller does not name one.
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Per-request batch size used when a source does not configure its own.
pub const DEFAULT_PAGE_SIZE: u32 = REMOTE_PAGE_SIZE_CAP;

/// One configured data-source: a remote collection, its access token, and the
/// filter expression applied to every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Opaque identifier of the remote collection
    pub app_no: String,

    /// Access token sent with every request for this source
    pub apitoken: String,

    /// Filter expression; the fetcher appends its own limit/offset clause
    #[serde(default)]
    pub query: String,

    /// Records per request, 1..=500
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Resolved settings for one environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the record-store endpoint
    pub base_url: String,

    /// Named data-sources in document order
    sources: Vec<(String, SourceConfig)>,
}

#[derive(Debug, Deserialize)]
struct EnvironmentDocument {
    base_url: String,
    configs: serde_json::Map<String, Value>,
}

impl Settings {
    /// Load the named environment from a settings file.
    ///
    /// A missing file, malformed JSON, an unknown environment name, or an
    /// out-of-range page size all fail here, before any network traffic.
    pub fn load(path: &Path, environment: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EngineError::config(format!("settings file '{}' not found", path.display()))
            } else {
                EngineError::Io(e)
            }
        })?;

        let document: serde_json::Map<String, Value> = serde_json::from_str(&raw)
            .map_err(|e| EngineError::config(format!("invalid settings JSON: {}", e)))?;

        let env_value = document.get(environment).ok_or_else(|| {
            let available: Vec<&str> = document.keys().map(String::as_str).collect();
            EngineError::config(format!(
                "environment '{}' not found; available environments: {}",
                environment,
                available.join(", ")
            ))
        })?;

        let env: EnvironmentDocument = serde_json::from_value(env_value.clone())
            .map_err(|e| EngineError::config(format!("environment '{}': {}", environment, e)))?;

        let mut sources = Vec::with_capacity(env.configs.len());
        for (name, value) in env.configs {
            let source: SourceConfig = serde_json::from_value(value).map_err(|e| {
                EngineError::config(format!("data-source '{}': {}", name, e))
            })?;

            if source.page_size == 0 || source.page_size > REMOTE_PAGE_SIZE_CAP {
                return Err(EngineError::config(format!(
                    "data-source '{}': page_size {} out of range (1..={})",
                    name, source.page_size, REMOTE_PAGE_SIZE_CAP
                )));
            }

            sources.push((name, source));
        }

        Ok(Self {
            base_url: env.base_url,
            sources,
        })
    }

    /// Named data-sources in document order.
    pub fn sources(&self) -> &[(String, SourceConfig)] {
        &self.sources
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_settings(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    const SETTINGS: &str = r#"{
        "production": {
            "base_url": "https://records.example.com/api",
            "configs": {
                "orders": { "app_no": "12", "apitoken": "tok-a", "query": "status = \"open\"" },
                "customers": { "app_no": "7", "apitoken": "tok-b", "page_size": 100 }
            }
        },
        "staging": {
            "base_url": "https://staging.example.com/api",
            "configs": {}
        }
    }"#;

    #[test]
    fn test_load_selected_environment() {
        let file = write_settings(SETTINGS);
        let settings = Settings::load(file.path(), "production").unwrap();

        assert_eq!(settings.base_url, "https://records.example.com/api");
        assert_eq!(settings.sources().len(), 2);

        // Document order is preserved.
        let (name, orders) = &settings.sources()[0];
        assert_eq!(name, "orders");
        assert_eq!(orders.app_no, "12");
        assert_eq!(orders.page_size, DEFAULT_PAGE_SIZE);

        let (name, customers) = &settings.sources()[1];
        assert_eq!(name, "customers");
        assert_eq!(customers.query, "");
        assert_eq!(customers.page_size, 100);
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let err = Settings::load(Path::new("/nonexistent/rtab.json"), "production").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_unknown_environment_lists_available() {
        let file = write_settings(SETTINGS);
        let err = Settings::load(file.path(), "qa").unwrap_err();

        let message = err.to_string();
        assert!(message.contains("'qa' not found"));
        assert!(message.contains("production"));
        assert!(message.contains("staging"));
    }

    #[test]
    fn test_malformed_json_is_a_config_error() {
        let file = write_settings("{ not json");
        let err = Settings::load(file.path(), "production").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_page_size_out_of_range() {
        let file = write_settings(
            r#"{"production": {"base_url": "https://x", "configs": {
                "big": { "app_no": "1", "apitoken": "t", "page_size": 501 }
            }}}"#,
        );
        let err = Settings::load(file.path(), "production").unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let file = write_settings(
            r#"{"production": {"base_url": "https://x", "configs": {
                "zero": { "app_no": "1", "apitoken": "t", "page_size": 0 }
            }}}"#,
        );
        let err = Settings::load(file.path(), "production").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
