//! Pipeline configuration.

use crate::errors::SluiceError;
use crate::observability::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the pipeline name.
pub const ENV_PIPELINE_NAME: &str = "SLUICE_PIPELINE_NAME";
/// Environment variable toggling lifecycle events.
pub const ENV_EMIT_EVENTS: &str = "SLUICE_EMIT_EVENTS";
/// Environment variable toggling the unhandled-failure warning.
pub const ENV_LOG_UNHANDLED: &str = "SLUICE_LOG_UNHANDLED";
/// Environment variable selecting the log format (`text` or `json`).
pub const ENV_LOG_FORMAT: &str = "SLUICE_LOG_FORMAT";

/// Configuration for a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Name used in logs and events.
    #[serde(default = "default_name")]
    pub name: String,
    /// Whether lifecycle events are sent to the event sink.
    #[serde(default = "default_true")]
    pub emit_events: bool,
    /// Whether a failure nobody observes is logged as a warning.
    #[serde(default = "default_true")]
    pub log_unhandled_errors: bool,
    /// Output format for [`init_logging`](crate::observability::init_logging).
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_name() -> String {
    "pipeline".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            emit_events: true,
            log_unhandled_errors: true,
            log_format: LogFormat::default(),
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pipeline name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Enables or disables lifecycle events.
    #[must_use]
    pub fn with_emit_events(mut self, enabled: bool) -> Self {
        self.emit_events = enabled;
        self
    }

    /// Enables or disables the unhandled-failure warning.
    #[must_use]
    pub fn with_log_unhandled_errors(mut self, enabled: bool) -> Self {
        self.log_unhandled_errors = enabled;
        self
    }

    /// Sets the log format.
    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, SluiceError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SluiceError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Builds a configuration from `SLUICE_*` environment variables.
    pub fn from_env() -> Result<Self, SluiceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// Unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SluiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup(ENV_PIPELINE_NAME) {
            if name.trim().is_empty() {
                return Err(SluiceError::config(format!("{ENV_PIPELINE_NAME} is empty")));
            }
            config.name = name;
        }
        if let Some(raw) = lookup(ENV_EMIT_EVENTS) {
            config.emit_events = parse_bool(ENV_EMIT_EVENTS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_LOG_UNHANDLED) {
            config.log_unhandled_errors = parse_bool(ENV_LOG_UNHANDLED, &raw)?;
        }
        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            config.log_format = raw.parse()?;
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, SluiceError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(SluiceError::config(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::new();
        assert_eq!(config.name, "pipeline");
        assert!(config.emit_events);
        assert!(config.log_unhandled_errors);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::new()
            .with_name("orders")
            .with_emit_events(false)
            .with_log_unhandled_errors(false)
            .with_log_format(LogFormat::Json);

        assert_eq!(config.name, "orders");
        assert!(!config.emit_events);
        assert!(!config.log_unhandled_errors);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_from_json_partial() {
        let config = PipelineConfig::from_json(r#"{"name": "ingest", "log_format": "json"}"#).unwrap();
        assert_eq!(config.name, "ingest");
        assert!(config.emit_events);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_from_json_invalid() {
        let result = PipelineConfig::from_json(r#"{"emit_events": "sometimes"}"#);
        assert!(matches!(result, Err(SluiceError::Serialization(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "from-disk", "emit_events": false}}"#).unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.name, "from-disk");
        assert!(!config.emit_events);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = PipelineConfig::from_file(dir.path().join("absent.json"));
        assert!(matches!(result, Err(SluiceError::Io(_))));
    }

    #[test]
    fn test_from_lookup() {
        let config = PipelineConfig::from_lookup(lookup(&[
            (ENV_PIPELINE_NAME, "webhooks"),
            (ENV_EMIT_EVENTS, "off"),
            (ENV_LOG_UNHANDLED, "YES"),
            (ENV_LOG_FORMAT, "json"),
        ]))
        .unwrap();

        assert_eq!(config.name, "webhooks");
        assert!(!config.emit_events);
        assert!(config.log_unhandled_errors);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_from_lookup_empty_keeps_defaults() {
        let config = PipelineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let result = PipelineConfig::from_lookup(lookup(&[(ENV_EMIT_EVENTS, "maybe")]));
        assert!(matches!(result, Err(SluiceError::Config(ref m)) if m.contains(ENV_EMIT_EVENTS)));

        let result = PipelineConfig::from_lookup(lookup(&[(ENV_PIPELINE_NAME, "  ")]));
        assert!(matches!(result, Err(SluiceError::Config(_))));

        let result = PipelineConfig::from_lookup(lookup(&[(ENV_LOG_FORMAT, "xml")]));
        assert!(matches!(result, Err(SluiceError::Config(_))));
    }
}
