//! Property test strategies for wrapper inputs
//!
//! # Example
//!
//! ```rust
//! use proptest::prelude::*;
//! use tilewrap_testkit::strategies::arb_field_count;
//!
//! proptest! {
//!     #[test]
//!     fn field_count_fits(count in arb_field_count()) {
//!         prop_assert!(count.checked_add(1).is_some());
//!     }
//! }
//! ```

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use tilewrap_core::{FieldId, FieldState, ProviderId, SerializationResponseCode, UsageScenario};
use uuid::Uuid;

/// Field counts a wrapped provider plausibly declares, including zero
pub fn arb_field_count() -> impl Strategy<Value = u32> {
    0u32..32
}

/// A field count together with an index inside `0..count`
pub fn arb_field_in_range() -> impl Strategy<Value = (u32, FieldId)> {
    (1u32..32).prop_flat_map(|count| (Just(count), (0..count).prop_map(FieldId::new)))
}

/// Status texts, biased towards the default connected sentinel
pub fn arb_status_text() -> impl Strategy<Value = String> {
    prop_oneof![
        2 => Just("Connected".to_string()),
        1 => Just("connected".to_string()),
        1 => Just(String::new()),
        4 => "[A-Za-z .]{1,24}",
    ]
}

/// Any visibility
pub fn arb_field_state() -> impl Strategy<Value = FieldState> {
    prop_oneof![
        Just(FieldState::Hidden),
        Just(FieldState::DisplayInSelectedTile),
        Just(FieldState::DisplayInDeselectedTile),
        Just(FieldState::DisplayInBoth),
    ]
}

/// Any serialization outcome a wrapped tile may report
pub fn arb_serialization_code() -> impl Strategy<Value = SerializationResponseCode> {
    prop_oneof![
        Just(SerializationResponseCode::NoCredentialNotFinished),
        Just(SerializationResponseCode::NoCredentialFinished),
        Just(SerializationResponseCode::ReturnCredentialFinished),
        Just(SerializationResponseCode::ReturnNoCredentialFinished),
    ]
}

/// Any usage scenario
pub fn arb_usage_scenario() -> impl Strategy<Value = UsageScenario> {
    prop_oneof![
        Just(UsageScenario::Logon),
        Just(UsageScenario::UnlockWorkstation),
        Just(UsageScenario::ChangePassword),
        Just(UsageScenario::CredUi),
        Just(UsageScenario::PreLogonAccessProvider),
    ]
}

/// Arbitrary provider identities
pub fn arb_provider_id() -> impl Strategy<Value = ProviderId> {
    any::<u128>().prop_map(|bits| ProviderId::from_uuid(Uuid::from_u128(bits)))
}
