//! Scope configuration

use serde::{Deserialize, Serialize};

use crate::ids::IdGenerator;

/// Knobs applied to a [`Scope`](crate::Scope) when it is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelConfig {
    /// Pattern used when a factory has to generate a public identifier
    pub id_pattern: String,
    /// Whether factories and container adds register public objects
    pub registration_enabled: bool,
    /// Whether structural changes are forwarded to the notifier
    pub notifications_enabled: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            id_pattern: IdGenerator::DEFAULT_PATTERN.to_string(),
            registration_enabled: true,
            notifications_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: ModelConfig =
            serde_json::from_str(r#"{"notificationsEnabled": false}"#).unwrap();
        assert_eq!(config.id_pattern, IdGenerator::DEFAULT_PATTERN);
        assert!(config.registration_enabled);
        assert!(!config.notifications_enabled);
    }
}
