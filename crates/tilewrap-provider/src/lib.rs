//! tilewrap provider
//!
//! A credential provider that impersonates another one. The host talks to
//! [`WrapperProvider`]; it instantiates the wrapped provider, reports every
//! tile with one extra check box field, and refuses to hand out a credential
//! unless that box is ticked. Once the wrapped tile reports that its
//! connection is already up, the box is hidden.
//!
//! Three proxies cooperate:
//!
//! - [`provider::WrapperProvider`] stands in for the wrapped provider
//! - [`credential::WrapperCredential`] stands in for each wrapped tile
//! - [`events::WrapperCredentialEvents`] stands in for the host's sink when
//!   the wrapped tile reports UI changes
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use tilewrap_core::{ComponentFactory, CredentialProvider, UsageScenario, WrapperConfig};
//!
//! fn load(factory: Arc<dyn ComponentFactory>) -> tilewrap_core::Result<()> {
//!     let config = WrapperConfig::load(Path::new("tilewrap.toml"))?;
//!     let provider = tilewrap_provider::create_instance(&config, factory)?;
//!     provider.set_usage_scenario(UsageScenario::PreLogonAccessProvider, 0)?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

/// Tile proxy
pub mod credential;

/// Sink proxy given to the wrapped tile
pub mod events;

/// Optional subscriber installation
pub mod logging;

/// Provider proxy
pub mod provider;

pub use credential::WrapperCredential;
pub use events::WrapperCredentialEvents;
pub use provider::WrapperProvider;

use std::sync::Arc;
use tilewrap_core::{ComponentFactory, ConfigValidation, Result, WrapperConfig};

/// Entry point the host calls to obtain the provider
///
/// Validates `config`, installs logging if enabled, and returns a provider
/// that will create the wrapped provider through `factory` on first use.
pub fn create_instance(
    config: &WrapperConfig,
    factory: Arc<dyn ComponentFactory>,
) -> Result<Arc<WrapperProvider>> {
    config.validate()?;
    if config.logging.enabled {
        logging::init(&config.logging)?;
    }

    tracing::info!(
        wrapped = %config.wrapped_provider,
        scenario = %config.scenario,
        "creating credential provider wrapper"
    );
    Ok(Arc::new(WrapperProvider::new(config.settings(), factory)))
}
