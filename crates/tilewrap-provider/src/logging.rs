//! Diagnostic logging
//!
//! The provider is loaded into a host process it does not own, so a global
//! subscriber is only installed when the configuration asks for one. If the
//! host already installed a subscriber, that one is kept.

use tilewrap_core::{CredentialError, LoggingConfig, Result};
use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber filtered by `config.filter`
///
/// Returns `Ok(false)` when a global subscriber was already present.
pub fn init(config: &LoggingConfig) -> Result<bool> {
    let filter = EnvFilter::try_new(&config.filter).map_err(|error| {
        CredentialError::config(format!("invalid logging.filter {:?}: {error}", config.filter))
    })?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok();

    tracing::debug!(filter = %config.filter, installed, "logging initialised");
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_invalid_filter_rejected() {
        let config = LoggingConfig {
            enabled: true,
            filter: "tilewrap=notalevel".to_string(),
        };
        assert_matches!(init(&config), Err(CredentialError::Config { .. }));
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        let config = LoggingConfig {
            enabled: true,
            filter: "debug".to_string(),
        };
        assert!(init(&config).is_ok());
        assert!(!init(&config).unwrap());
    }
}
