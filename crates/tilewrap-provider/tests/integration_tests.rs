//! Integration tests driving the wrapper the way the host does
//!
//! The host creates the provider, enumerates fields and tiles, attaches its
//! sinks, and then reacts to what the wrapped tile reports.

#![allow(clippy::unwrap_used)]

use assert_matches::assert_matches;
use parking_lot::Mutex;
use std::sync::Arc;
use tilewrap_core::{
    credential_addr, errors::E_UNEXPECTED, hresult_of, ComponentFactory, Credential,
    CredentialError, CredentialProvider, FieldId, FieldKind, FieldState, ProviderFilter,
    SerializationResponseCode, UsageScenario, WrapperConfig, RAS_PLAP_PROVIDER,
};
use tilewrap_provider::{create_instance, WrapperProvider};
use tilewrap_testkit::{
    AlwaysContinue, MockFactory, MockProvider, RecordedEvent, RecordingEvents,
    RecordingProviderEvents,
};

const SCENARIO: UsageScenario = UsageScenario::PreLogonAccessProvider;

fn setup(fields: u32, tiles: u32) -> (Arc<WrapperProvider>, Arc<MockProvider>) {
    let wrapped = MockProvider::new(fields, tiles);
    let factory: Arc<dyn ComponentFactory> = MockFactory::with_provider(wrapped.clone());
    let provider = create_instance(&WrapperConfig::default(), factory).unwrap();
    provider.set_usage_scenario(SCENARIO, 0).unwrap();
    (provider, wrapped)
}

#[test]
fn test_end_to_end_logon_flow() {
    let (provider, wrapped) = setup(3, 1);

    assert_eq!(provider.field_descriptor_count().unwrap(), 4);
    let toggle = provider.field_descriptor_at(FieldId::new(3)).unwrap();
    assert_eq!(toggle.kind, FieldKind::Checkbox);
    assert_eq!(toggle.label, "Use SSO");

    let count = provider.credential_count().unwrap();
    assert_eq!(count.count, 1);
    assert_eq!(count.default, None);
    assert!(!count.auto_logon_with_default);

    let tile = provider.credential_at(0).unwrap();
    let host = RecordingEvents::new();
    tile.advise(host.clone()).unwrap();
    assert!(!tile.set_selected().unwrap());

    // Toggle starts cleared, so nothing is submitted.
    assert!(!tile.checkbox_value(FieldId::new(3)).unwrap().checked);
    let response = tile.serialization().unwrap();
    assert_eq!(response.response, SerializationResponseCode::NoCredentialFinished);

    tile.set_checkbox_value(FieldId::new(3), true).unwrap();
    let response = tile.serialization().unwrap();
    assert_eq!(
        response.response,
        SerializationResponseCode::ReturnCredentialFinished
    );

    let inner = wrapped.credential(0).unwrap();
    assert!(inner.is_selected());
    tile.unadvise().unwrap();
    assert_eq!(inner.calls("unadvise"), 1);
}

#[test]
fn test_connected_status_hides_toggle_end_to_end() {
    let (provider, wrapped) = setup(3, 1);
    let tile = provider.credential_at(0).unwrap();
    let host = RecordingEvents::new();
    tile.advise(host.clone()).unwrap();

    let inner = wrapped.credential(0).unwrap();
    inner.emit_string(FieldId::new(2), "Connected").unwrap();

    let tile_addr = credential_addr(tile.as_ref());
    assert_eq!(
        host.events(),
        vec![
            RecordedEvent::FieldString {
                credential: tile_addr,
                field: FieldId::new(2),
                text: "Connected".to_string(),
            },
            RecordedEvent::FieldState {
                credential: tile_addr,
                field: FieldId::new(3),
                state: FieldState::Hidden,
            },
        ]
    );

    inner.emit_string(FieldId::new(2), "Disconnected").unwrap();
    assert_eq!(
        host.field_states().last(),
        Some(&(FieldId::new(3), FieldState::DisplayInSelectedTile))
    );
}

#[test]
fn test_host_may_reenter_tile_from_sink() {
    let (provider, wrapped) = setup(3, 1);
    let tile = provider.credential_at(0).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_by_host = seen.clone();
    let host = RecordingEvents::with_hook(move |credential: &dyn Credential| {
        let pair = credential.field_state(FieldId::new(3)).unwrap();
        let label = credential.string_value(FieldId::new(3)).unwrap();
        seen_by_host.lock().push((pair.state, label));
    });
    tile.advise(host.clone()).unwrap();

    wrapped
        .credential(0)
        .unwrap()
        .emit_string(FieldId::new(0), "hello")
        .unwrap();

    assert_eq!(
        *seen.lock(),
        vec![(FieldState::DisplayInSelectedTile, "Use SSO".to_string())]
    );
}

#[test]
fn test_dropping_tile_silences_proxy() {
    let (provider, wrapped) = setup(3, 1);
    let tile = provider.credential_at(0).unwrap();
    let host = RecordingEvents::new();
    tile.advise(host.clone()).unwrap();

    let inner = wrapped.credential(0).unwrap();
    drop(tile);

    let err = inner.emit_string(FieldId::new(2), "Connected").unwrap_err();
    assert!(err.is_unexpected());
    assert_eq!(hresult_of::<()>(&Err(err)), E_UNEXPECTED);
    assert!(host.events().is_empty());
    // Only the test still holds the host sink.
    assert_eq!(Arc::strong_count(&host), 1);
}

#[test]
fn test_each_enumeration_yields_fresh_tile() {
    let (provider, _) = setup(3, 2);
    let first = provider.credential_at(0).unwrap();
    let again = provider.credential_at(0).unwrap();
    let second = provider.credential_at(1).unwrap();

    assert_ne!(credential_addr(first.as_ref()), credential_addr(again.as_ref()));
    assert_ne!(credential_addr(first.as_ref()), credential_addr(second.as_ref()));
    assert!(matches!(
        provider.credential_at(2),
        Err(CredentialError::InvalidArgument { .. })
    ));
}

#[test]
fn test_connect_through_wrapper() {
    let (provider, wrapped) = setup(3, 1);
    let tile = provider.credential_at(0).unwrap();
    let connectable = tile.into_connectable().unwrap();

    let status = AlwaysContinue::default();
    connectable.connect(&status).unwrap();
    assert!(wrapped.credential(0).unwrap().is_connected());
    assert_eq!(status.messages(), vec!["Connecting".to_string()]);

    connectable.disconnect().unwrap();
    assert!(!wrapped.credential(0).unwrap().is_connected());
}

#[test]
fn test_provider_sink_and_serialization_forwarded() {
    let (provider, wrapped) = setup(3, 1);
    let events = Arc::new(RecordingProviderEvents::default());
    provider.advise(events.clone(), 42).unwrap();

    wrapped.notify_changed().unwrap();
    assert_eq!(events.notifications(), vec![42]);

    let serialization = tilewrap_core::CredentialSerialization {
        auth_package: 7,
        provider: Some(RAS_PLAP_PROVIDER),
        flags: 0,
        data: vec![1, 2, 3],
    };
    provider.set_serialization(&serialization).unwrap();
    assert_eq!(wrapped.last_serialization(), Some(serialization));

    provider.unadvise().unwrap();
    assert!(!wrapped.is_advised());
}

#[test]
fn test_filter_with_default_configuration() {
    let (provider, _) = setup(3, 1);
    let others = [
        tilewrap_core::ProviderId::random(),
        RAS_PLAP_PROVIDER,
        tilewrap_core::ProviderId::random(),
    ];
    let mut allow = [true, true, true];
    provider.filter(SCENARIO, 0, &others, &mut allow).unwrap();
    assert_eq!(allow, [true, false, true]);
}

#[test]
fn test_create_instance_rejects_invalid_config() {
    let mut config = WrapperConfig::default();
    config.toggle.label = String::new();
    let factory: Arc<dyn ComponentFactory> = MockFactory::failing();
    assert_matches!(
        create_instance(&config, factory).err(),
        Some(CredentialError::Config { .. })
    );
}

#[test]
fn test_configured_labels_and_status_field() {
    let config = WrapperConfig::from_toml_str(
        r#"
        [toggle]
        label = "Single sign-on"

        [status]
        field = 1
        connected_text = "Online"
        "#,
    )
    .unwrap();
    let wrapped = MockProvider::new(2, 1);
    let provider = create_instance(&config, MockFactory::with_provider(wrapped.clone())).unwrap();
    provider.set_usage_scenario(SCENARIO, 0).unwrap();

    assert_eq!(
        provider.field_descriptor_at(FieldId::new(2)).unwrap().label,
        "Single sign-on"
    );

    let tile = provider.credential_at(0).unwrap();
    let host = RecordingEvents::new();
    tile.advise(host.clone()).unwrap();
    let inner = wrapped.credential(0).unwrap();

    inner.emit_string(FieldId::new(1), "Online").unwrap();
    assert_eq!(host.field_states(), vec![(FieldId::new(2), FieldState::Hidden)]);
}

#[test]
fn test_window_request_reaches_host() {
    let (provider, wrapped) = setup(3, 1);
    let tile = provider.credential_at(0).unwrap();
    let host = RecordingEvents::new();
    tile.advise(host.clone()).unwrap();

    let window = wrapped.credential(0).unwrap().request_window().unwrap();
    assert_eq!(window, host.window());
    assert_eq!(host.windows_requested(), 1);
}
