//! Wrapper configuration
//!
//! The configuration names the provider being wrapped, the scenario the
//! wrapper answers for, the appended toggle's label and the status field whose
//! text decides whether the toggle is shown. Every key is optional; missing
//! keys fall back to the values the RAS pre-logon wrapper ships with.

use crate::errors::{CredentialError, Result};
use crate::identifiers::{FieldId, ProviderId};
use crate::types::UsageScenario;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Class identifier of the RAS pre-logon access provider
pub const RAS_PLAP_PROVIDER: ProviderId =
    ProviderId::from_uuid(Uuid::from_u128(0x5537_e283_b1e7_4ef8_9c6e_7ab0_afe5_056d));

/// Label of the appended toggle
pub const DEFAULT_TOGGLE_LABEL: &str = "Use SSO";

/// Text the wrapped tile reports once the connection is up
pub const DEFAULT_CONNECTED_TEXT: &str = "Connected";

/// Field on which the wrapped RAS tile reports its connection status
pub const DEFAULT_STATUS_FIELD: FieldId = FieldId::new(2);

/// Configuration validation
pub trait ConfigValidation {
    /// Validate the configuration
    fn validate(&self) -> Result<()>;
}

/// Configuration defaults
pub trait ConfigDefaults {
    /// Create configuration with default values
    fn defaults() -> Self;
}

/// Top-level wrapper configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WrapperConfig {
    /// Provider instantiated and wrapped
    pub wrapped_provider: ProviderId,
    /// The only scenario the wrapper accepts
    pub scenario: UsageScenario,
    /// Appended toggle
    pub toggle: ToggleConfig,
    /// Connection-status watch
    pub status: StatusConfig,
    /// Diagnostics
    pub logging: LoggingConfig,
}

/// Appended toggle settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToggleConfig {
    /// Text shown next to the check box
    pub label: String,
}

/// Which status update hides the toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusConfig {
    /// Wrapped field carrying the connection status text
    pub field: FieldId,
    /// Status text meaning "already connected"
    pub connected_text: String,
}

/// Diagnostic logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Install a subscriber when the provider is created
    pub enabled: bool,
    /// `EnvFilter` directive string
    pub filter: String,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_TOGGLE_LABEL.to_string(),
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            field: DEFAULT_STATUS_FIELD,
            connected_text: DEFAULT_CONNECTED_TEXT.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filter: "info".to_string(),
        }
    }
}

impl ConfigDefaults for WrapperConfig {
    fn defaults() -> Self {
        Self {
            wrapped_provider: RAS_PLAP_PROVIDER,
            scenario: UsageScenario::PreLogonAccessProvider,
            toggle: ToggleConfig::default(),
            status: StatusConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ConfigValidation for WrapperConfig {
    fn validate(&self) -> Result<()> {
        if self.wrapped_provider.is_nil() {
            return Err(CredentialError::config("wrapped_provider must not be nil"));
        }
        if self.toggle.label.trim().is_empty() {
            return Err(CredentialError::config("toggle.label must not be empty"));
        }
        if self.status.connected_text.is_empty() {
            return Err(CredentialError::config(
                "status.connected_text must not be empty",
            ));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(CredentialError::config("logging.filter must not be empty"));
        }
        Ok(())
    }
}

impl WrapperConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::defaults());
        }

        let source = std::fs::read_to_string(path).map_err(|e| {
            CredentialError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml_str(&source).map_err(|e| {
            CredentialError::config(format!(
                "Failed to load config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Immutable settings snapshot shared by every proxy of one provider
    pub fn settings(&self) -> WrapperSettings {
        WrapperSettings {
            scenario: self.scenario,
            wrapped_provider: self.wrapped_provider,
            toggle_label: self.toggle.label.clone(),
            status_field: self.status.field,
            connected_text: self.status.connected_text.clone(),
        }
    }
}

/// Per-provider settings handed down to tiles and sink proxies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperSettings {
    /// Accepted scenario
    pub scenario: UsageScenario,
    /// Wrapped provider identity, hidden from the host by the filter
    pub wrapped_provider: ProviderId,
    /// Toggle label
    pub toggle_label: String,
    /// Field carrying the connection status
    pub status_field: FieldId,
    /// Status text that hides the toggle
    pub connected_text: String,
}

impl Default for WrapperSettings {
    fn default() -> Self {
        WrapperConfig::defaults().settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = WrapperConfig::defaults();
        assert!(config.validate().is_ok());
        assert_eq!(config.wrapped_provider, RAS_PLAP_PROVIDER);
        assert_eq!(config.scenario, UsageScenario::PreLogonAccessProvider);
        assert_eq!(config.toggle.label, "Use SSO");
        assert_eq!(config.status.connected_text, "Connected");
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = WrapperConfig::from_toml_str(
            r#"
            [status]
            field = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.status.field, FieldId::new(5));
        assert_eq!(config.status.connected_text, DEFAULT_CONNECTED_TEXT);
        assert_eq!(config.toggle.label, DEFAULT_TOGGLE_LABEL);
    }

    #[test]
    fn test_full_document() {
        let config = WrapperConfig::from_toml_str(
            r#"
            wrapped_provider = "11111111-2222-3333-4444-555555555555"
            scenario = "logon"

            [toggle]
            label = "Single sign-on"

            [status]
            field = 1
            connected_text = "Online"

            [logging]
            enabled = true
            filter = "tilewrap=debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.scenario, UsageScenario::Logon);
        assert_eq!(config.toggle.label, "Single sign-on");
        assert_eq!(config.status.field, FieldId::new(1));
        assert!(config.logging.enabled);

        let settings = config.settings();
        assert_eq!(settings.connected_text, "Online");
        assert_eq!(settings.wrapped_provider, config.wrapped_provider);
    }

    #[test]
    fn test_validation_rejects_empty_label() {
        let err = WrapperConfig::from_toml_str(
            r#"
            [toggle]
            label = "  "
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CredentialError::Config { .. }));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(WrapperConfig::from_toml_str("colour = \"blue\"").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WrapperConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, WrapperConfig::defaults());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[status]\nconnected_text = \"Up\"").unwrap();
        let config = WrapperConfig::load(file.path()).unwrap();
        assert_eq!(config.status.connected_text, "Up");
    }

    #[test]
    fn test_load_unreadable_path_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = WrapperConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, CredentialError::Config { .. }));
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
