//! tilewrap core
//!
//! Shared vocabulary for wrapping a pluggable credential provider: the
//! provider/tile/sink contract as object-safe traits, the value types that
//! flow across it, identifiers, the error type that maps onto host status
//! codes, and the wrapper's configuration.
//!
//! Nothing in this crate holds state; the proxies that implement the contract
//! live in `tilewrap-provider`.

#![forbid(unsafe_code)]

/// Provider, tile and sink traits
pub mod contract;

/// Wrapper configuration and per-provider settings
pub mod config;

/// Error type and host status codes
pub mod errors;

/// Routing between wrapped fields and the appended field
pub mod field;

/// Provider identities, field indices and opaque host handles
pub mod identifiers;

/// Values exchanged across the contract
pub mod types;

pub use config::{
    ConfigDefaults, ConfigValidation, LoggingConfig, StatusConfig, ToggleConfig, WrapperConfig,
    WrapperSettings, RAS_PLAP_PROVIDER,
};
pub use contract::{
    credential_addr, ComponentFactory, ConnectableCredential, Credential, CredentialEvents,
    CredentialProvider, ProviderEvents, ProviderFilter, QueryContinueWithStatus,
};
pub use errors::{hresult_of, CredentialError, Result};
pub use field::{FieldRoute, SyntheticField};
pub use identifiers::{BitmapHandle, FieldId, NtStatus, ProviderId, WindowHandle};
pub use types::{
    CheckboxValue, ComboBoxCount, CredentialCount, CredentialSerialization, FieldDescriptor,
    FieldInteractiveState, FieldKind, FieldState, FieldStatePair, SerializationResponse,
    SerializationResponseCode, StatusIcon, StatusReport, UsageScenario,
};
