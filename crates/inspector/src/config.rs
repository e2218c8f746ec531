//! Inspector configuration

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use seisdm_datamodel::ModelConfig;

/// Inspector configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// JSON document to load
    pub document: PathBuf,
    /// Where to write the re-exported document, if anywhere
    pub export: Option<PathBuf>,
    /// Name of the scope the document is loaded into
    pub scope_name: String,
    /// Data model switches and id pattern
    pub model: ModelConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// `document` (the command line argument) takes precedence over
    /// `SEISDM_DOCUMENT`.
    pub fn from_env(document: Option<String>) -> Result<Self> {
        Self::from_lookup(|key| match key {
            "SEISDM_DOCUMENT" if document.is_some() => document.clone(),
            _ => env::var(key).ok(),
        })
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = ModelConfig::default();

        Ok(Self {
            document: lookup("SEISDM_DOCUMENT")
                .map(PathBuf::from)
                .context("SEISDM_DOCUMENT environment variable is required")?,
            export: lookup("SEISDM_EXPORT")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            scope_name: lookup("SEISDM_SCOPE").unwrap_or_else(|| "document".to_string()),
            model: ModelConfig {
                id_pattern: lookup("SEISDM_ID_PATTERN").unwrap_or(defaults.id_pattern),
                registration_enabled: parse_flag(
                    "SEISDM_REGISTRATION",
                    lookup("SEISDM_REGISTRATION"),
                    defaults.registration_enabled,
                )?,
                notifications_enabled: parse_flag(
                    "SEISDM_NOTIFICATIONS",
                    lookup("SEISDM_NOTIFICATIONS"),
                    defaults.notifications_enabled,
                )?,
            },
        })
    }
}

fn parse_flag(name: &str, value: Option<String>, default: bool) -> Result<bool> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("{name} must be a boolean, got '{other}'"),
    }
}
