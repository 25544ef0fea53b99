use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::output::DEFAULT_EXPORT_FILE;
use crate::request::DEFAULT_LIST_LEN;

/// Runtime settings. Every field is optional; command-line flags override
/// the JSON file, which overrides the environment.
///
/// ```json
/// {
///   "data_source": "data/traffic_density_202412.csv",
///   "list_len": 10,
///   "export_path": "filtered_traffic_data.csv",
///   "s3_bucket": "my-bucket"
/// }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub data_source: Option<String>,
    pub list_len: Option<usize>,
    pub export_path: Option<String>,
    pub s3_bucket: Option<String>,
    #[serde(skip)]
    pub source_token: Option<String>,
}

impl DashboardConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config '{}'", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config '{}'", path.display()))?;
        Ok(config)
    }

    /// Reads `TRAFFIC_DATA_SOURCE` and `TRAFFIC_SOURCE_TOKEN`.
    pub fn from_env() -> Self {
        Self {
            data_source: std::env::var("TRAFFIC_DATA_SOURCE").ok(),
            source_token: std::env::var("TRAFFIC_SOURCE_TOKEN").ok(),
            ..Default::default()
        }
    }

    /// Fields set in `other` replace ours.
    pub fn overlay(self, other: DashboardConfig) -> Self {
        Self {
            data_source: other.data_source.or(self.data_source),
            list_len: other.list_len.or(self.list_len),
            export_path: other.export_path.or(self.export_path),
            s3_bucket: other.s3_bucket.or(self.s3_bucket),
            source_token: other.source_token.or(self.source_token),
        }
    }

    pub fn list_len(&self) -> usize {
        self.list_len.unwrap_or(DEFAULT_LIST_LEN)
    }

    pub fn export_path(&self) -> &str {
        self.export_path.as_deref().unwrap_or(DEFAULT_EXPORT_FILE)
    }
}
