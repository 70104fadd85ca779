//! Unified error type for the credential provider contract
//!
//! Every contract operation returns [`Result`]. Each variant maps onto exactly
//! one host status code through [`CredentialError::hresult`], so the host sees
//! the same codes whether a failure was produced locally or by a wrapped
//! component.

use serde::{Deserialize, Serialize};

/// Host status code for success.
pub const S_OK: u32 = 0x0000_0000;
/// Host status code for an operation that is invalid in the current state.
pub const E_UNEXPECTED: u32 = 0x8000_FFFF;
/// Host status code for a failed allocation.
pub const E_OUTOFMEMORY: u32 = 0x8007_000E;
/// Host status code for an operation that is not implemented.
pub const E_NOTIMPL: u32 = 0x8000_4001;
/// Host status code for a component lacking a required capability.
pub const E_NOINTERFACE: u32 = 0x8000_4002;
/// Host status code for a request the component does not support.
pub const E_NOTSUPPORTED: u32 = 0x8007_0032;
/// Host status code for a malformed argument.
pub const E_INVALIDARG: u32 = 0x8007_0057;

/// Error type for all contract operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum CredentialError {
    /// Operation invoked before the binding it needs exists
    #[error("Unexpected: {message}")]
    Unexpected {
        /// What was missing or out of place
        message: String,
    },

    /// A proxy, descriptor or wrapped component could not be created
    #[error("Allocation failed: {message}")]
    AllocationFailed {
        /// What could not be allocated
        message: String,
    },

    /// The operation is deliberately left unimplemented
    #[error("Not implemented: {operation}")]
    NotImplemented {
        /// Name of the unimplemented operation
        operation: String,
    },

    /// A wrapped component does not expose a capability the wrapper needs
    #[error("No interface: {message}")]
    NoInterface {
        /// Which capability was missing
        message: String,
    },

    /// The usage scenario is not one this provider handles
    #[error("Usage scenario not supported: {scenario}")]
    NotSupported {
        /// The rejected scenario
        scenario: String,
    },

    /// Caller passed inconsistent or malformed input
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the bad input
        message: String,
    },

    /// Opaque failure reported by a wrapped component
    #[error("Failed with status {code:#010x}: {message}")]
    Failed {
        /// Status code reported by the component
        code: u32,
        /// Component-supplied description
        message: String,
    },

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },
}

impl CredentialError {
    /// Create an unexpected-state error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Create an allocation failure
    pub fn allocation(message: impl Into<String>) -> Self {
        Self::AllocationFailed {
            message: message.into(),
        }
    }

    /// Create a not-implemented error for the named operation
    pub fn not_implemented(operation: impl Into<String>) -> Self {
        Self::NotImplemented {
            operation: operation.into(),
        }
    }

    /// Create a missing-capability error
    pub fn no_interface(message: impl Into<String>) -> Self {
        Self::NoInterface {
            message: message.into(),
        }
    }

    /// Create an unsupported-scenario error
    pub fn not_supported(scenario: impl ToString) -> Self {
        Self::NotSupported {
            scenario: scenario.to_string(),
        }
    }

    /// Create an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an opaque component failure
    pub fn failed(code: u32, message: impl Into<String>) -> Self {
        Self::Failed {
            code,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Status code the host sees for this error
    pub fn hresult(&self) -> u32 {
        match self {
            Self::Unexpected { .. } => E_UNEXPECTED,
            Self::AllocationFailed { .. } => E_OUTOFMEMORY,
            Self::NotImplemented { .. } => E_NOTIMPL,
            Self::NoInterface { .. } => E_NOINTERFACE,
            Self::NotSupported { .. } => E_NOTSUPPORTED,
            Self::InvalidArgument { .. } | Self::Config { .. } => E_INVALIDARG,
            Self::Failed { code, .. } => *code,
        }
    }

    /// True for errors caused by a missing or torn-down binding
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Self::Unexpected { .. })
    }
}

/// Standard Result type for contract operations
pub type Result<T> = std::result::Result<T, CredentialError>;

/// Collapse a contract result into the host status code
pub fn hresult_of<T>(result: &Result<T>) -> u32 {
    match result {
        Ok(_) => S_OK,
        Err(err) => err.hresult(),
    }
}

impl From<toml::de::Error> for CredentialError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}
