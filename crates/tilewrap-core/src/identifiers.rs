//! Identifier and handle types used across the provider contract
//!
//! Providers are identified by class identifiers (UUIDs); fields inside a
//! tile are identified by their zero-based position. Bitmap and window
//! handles are opaque values owned by the host and passed through untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Class identifier of a credential provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub Uuid);

impl ProviderId {
    /// Create from a UUID
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create a fresh random provider identity
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// True for the all-zero identifier
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.0.hyphenated())
    }
}

impl FromStr for ProviderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('{').trim_end_matches('}');
        Uuid::parse_str(trimmed).map(Self)
    }
}

impl From<Uuid> for ProviderId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ProviderId> for Uuid {
    fn from(id: ProviderId) -> Self {
        id.0
    }
}

/// Zero-based index of a field within a tile
///
/// Indices are stable for as long as the provider's field count is.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FieldId(pub u32);

impl FieldId {
    /// Create a new field index
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index
    pub const fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field-{}", self.0)
    }
}

impl From<u32> for FieldId {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

/// Opaque host bitmap handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitmapHandle(pub u64);

/// Opaque host window handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

/// Authentication package status as reported back by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NtStatus(pub i32);

impl NtStatus {
    /// `STATUS_SUCCESS`
    pub const SUCCESS: Self = Self(0);

    /// True for non-negative (success or informational) values
    pub fn is_success(&self) -> bool {
        self.0 >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_braced_roundtrip() {
        let id: ProviderId = "{5537E283-B1E7-4EF8-9C6E-7AB0AFE5056D}".parse().unwrap();
        assert_eq!(id.to_string(), "{5537e283-b1e7-4ef8-9c6e-7ab0afe5056d}");
        assert_eq!(id.to_string().parse::<ProviderId>().unwrap(), id);
    }

    #[test]
    fn test_provider_id_plain_form() {
        let id: ProviderId = "5537e283-b1e7-4ef8-9c6e-7ab0afe5056d".parse().unwrap();
        assert!(!id.is_nil());
        assert!("not-a-guid".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_field_id_ordering() {
        assert!(FieldId::new(2) < FieldId::new(3));
        assert_eq!(FieldId::from(4).index(), 4);
        assert_eq!(FieldId::new(7).to_string(), "field-7");
    }

    #[test]
    fn test_nt_status() {
        assert!(NtStatus::SUCCESS.is_success());
        assert!(!NtStatus(0xC000_006Du32 as i32).is_success());
    }
}
