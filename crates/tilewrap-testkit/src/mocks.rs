//! Mock wrapped provider, wrapped tiles and component factory
//!
//! The mocks keep their state behind a `parking_lot::Mutex` and never hold it
//! while calling out, so a sink they call may re-enter them.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tilewrap_core::{
    BitmapHandle, CheckboxValue, ComboBoxCount, ComponentFactory, ConnectableCredential,
    Credential, CredentialCount, CredentialError, CredentialEvents, CredentialProvider,
    CredentialSerialization, FieldDescriptor, FieldId, FieldInteractiveState, FieldKind,
    FieldState, FieldStatePair, NtStatus, ProviderEvents, ProviderId, QueryContinueWithStatus,
    Result, SerializationResponse, SerializationResponseCode, StatusIcon, StatusReport,
    UsageScenario, WindowHandle,
};

/// Per-operation call counters with one-shot injected failures
#[derive(Default)]
struct CallLog {
    calls: BTreeMap<&'static str, usize>,
    failures: HashMap<&'static str, CredentialError>,
}

impl CallLog {
    fn record(&mut self, operation: &'static str) -> Result<()> {
        *self.calls.entry(operation).or_default() += 1;
        match self.failures.remove(operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn count(&self, operation: &str) -> usize {
        self.calls.get(operation).copied().unwrap_or(0)
    }

    fn total(&self) -> usize {
        self.calls.values().sum()
    }
}

/// Kind the mock provider declares for the field at `index`
///
/// Field 2 is a small text so that it can carry a connection status.
fn mock_field_kind(index: u32) -> FieldKind {
    match index {
        0 => FieldKind::LargeText,
        1 => FieldKind::EditText,
        2 => FieldKind::SmallText,
        _ => FieldKind::PasswordText,
    }
}

fn out_of_range(field: FieldId, count: u32) -> CredentialError {
    CredentialError::invalid_argument(format!("{field} out of range for {count} fields"))
}

struct MockCredentialState {
    log: CallLog,
    strings: BTreeMap<FieldId, String>,
    checkboxes: BTreeMap<FieldId, bool>,
    combo_selection: BTreeMap<FieldId, u32>,
    sink: Option<Arc<dyn CredentialEvents>>,
    serialization_code: SerializationResponseCode,
    serialization_status: (Option<String>, StatusIcon),
    selected: bool,
    connected: bool,
}

/// Scriptable wrapped tile
pub struct MockCredential {
    fields: u32,
    connectable: bool,
    state: Mutex<MockCredentialState>,
}

impl MockCredential {
    fn build(fields: u32, connectable: bool) -> Arc<Self> {
        Arc::new(Self {
            fields,
            connectable,
            state: Mutex::new(MockCredentialState {
                log: CallLog::default(),
                strings: BTreeMap::new(),
                checkboxes: BTreeMap::new(),
                combo_selection: BTreeMap::new(),
                sink: None,
                serialization_code: SerializationResponseCode::ReturnCredentialFinished,
                serialization_status: (None, StatusIcon::None),
                selected: false,
                connected: false,
            }),
        })
    }

    /// Tile that exposes the connect capability
    pub fn connectable(fields: u32) -> Arc<Self> {
        Self::build(fields, true)
    }

    /// Tile without the connect capability
    pub fn plain(fields: u32) -> Arc<Self> {
        Self::build(fields, false)
    }

    /// Number of fields this tile declares
    pub fn field_count(&self) -> u32 {
        self.fields
    }

    /// Calls made to `operation` so far
    pub fn calls(&self, operation: &str) -> usize {
        self.state.lock().log.count(operation)
    }

    /// Calls made to any operation so far
    pub fn total_calls(&self) -> usize {
        self.state.lock().log.total()
    }

    /// Fail the next call to `operation` with `error`
    pub fn fail_next(&self, operation: &'static str, error: CredentialError) {
        self.state.lock().log.failures.insert(operation, error);
    }

    /// Response code reported by subsequent serialization requests
    pub fn set_serialization_code(&self, code: SerializationResponseCode) {
        self.state.lock().serialization_code = code;
    }

    /// Status text and icon attached to subsequent serialization responses
    pub fn set_serialization_status(&self, text: Option<&str>, icon: StatusIcon) {
        self.state.lock().serialization_status = (text.map(str::to_string), icon);
    }

    /// Sink currently attached through `advise`
    pub fn advised_sink(&self) -> Option<Arc<dyn CredentialEvents>> {
        self.state.lock().sink.clone()
    }

    /// Whether the tile is selected
    pub fn is_selected(&self) -> bool {
        self.state.lock().selected
    }

    /// Whether `connect` succeeded without a later `disconnect`
    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    fn sink(&self) -> Result<Arc<dyn CredentialEvents>> {
        self.advised_sink()
            .ok_or_else(|| CredentialError::unexpected("mock credential has no sink"))
    }

    /// Report new text for `field` to the attached sink, naming this tile
    pub fn emit_string(&self, field: FieldId, text: &str) -> Result<()> {
        self.state.lock().strings.insert(field, text.to_string());
        self.sink()?.set_field_string(self, field, text)
    }

    /// Report a visibility change for `field` to the attached sink
    pub fn emit_state(&self, field: FieldId, state: FieldState) -> Result<()> {
        self.sink()?.set_field_state(self, field, state)
    }

    /// Ask the attached sink for a parent window
    pub fn request_window(&self) -> Result<WindowHandle> {
        self.sink()?.on_creating_window()
    }

    fn record(&self, operation: &'static str) -> Result<()> {
        self.state.lock().log.record(operation)
    }

    fn check_field(&self, field: FieldId) -> Result<()> {
        if field.index() < self.fields {
            Ok(())
        } else {
            Err(out_of_range(field, self.fields))
        }
    }
}

impl Credential for MockCredential {
    fn advise(&self, events: Arc<dyn CredentialEvents>) -> Result<()> {
        self.record("advise")?;
        self.state.lock().sink = Some(events);
        Ok(())
    }

    fn unadvise(&self) -> Result<()> {
        self.record("unadvise")?;
        let released = self.state.lock().sink.take();
        drop(released);
        Ok(())
    }

    fn set_selected(&self) -> Result<bool> {
        self.record("set_selected")?;
        self.state.lock().selected = true;
        Ok(false)
    }

    fn set_deselected(&self) -> Result<()> {
        self.record("set_deselected")?;
        self.state.lock().selected = false;
        Ok(())
    }

    fn field_state(&self, field: FieldId) -> Result<FieldStatePair> {
        self.record("field_state")?;
        self.check_field(field)?;
        Ok(FieldStatePair::new(
            FieldState::DisplayInBoth,
            FieldInteractiveState::None,
        ))
    }

    fn string_value(&self, field: FieldId) -> Result<String> {
        self.record("string_value")?;
        self.check_field(field)?;
        let state = self.state.lock();
        Ok(state
            .strings
            .get(&field)
            .cloned()
            .unwrap_or_else(|| field.to_string()))
    }

    fn bitmap_value(&self, field: FieldId) -> Result<BitmapHandle> {
        self.record("bitmap_value")?;
        self.check_field(field)?;
        Ok(BitmapHandle(u64::from(field.index()) + 1))
    }

    fn checkbox_value(&self, field: FieldId) -> Result<CheckboxValue> {
        self.record("checkbox_value")?;
        self.check_field(field)?;
        let checked = self
            .state
            .lock()
            .checkboxes
            .get(&field)
            .copied()
            .unwrap_or(false);
        Ok(CheckboxValue {
            checked,
            label: field.to_string(),
        })
    }

    fn submit_button_value(&self, field: FieldId) -> Result<FieldId> {
        self.record("submit_button_value")?;
        self.check_field(field)?;
        Ok(FieldId::new(field.index().saturating_sub(1)))
    }

    fn combo_box_value_count(&self, field: FieldId) -> Result<ComboBoxCount> {
        self.record("combo_box_value_count")?;
        self.check_field(field)?;
        let selected = self
            .state
            .lock()
            .combo_selection
            .get(&field)
            .copied()
            .unwrap_or(0);
        Ok(ComboBoxCount { items: 2, selected })
    }

    fn combo_box_value_at(&self, field: FieldId, item: u32) -> Result<String> {
        self.record("combo_box_value_at")?;
        self.check_field(field)?;
        Ok(format!("{field}-item-{item}"))
    }

    fn set_string_value(&self, field: FieldId, value: &str) -> Result<()> {
        self.record("set_string_value")?;
        self.check_field(field)?;
        self.state.lock().strings.insert(field, value.to_string());
        Ok(())
    }

    fn set_checkbox_value(&self, field: FieldId, checked: bool) -> Result<()> {
        self.record("set_checkbox_value")?;
        self.check_field(field)?;
        self.state.lock().checkboxes.insert(field, checked);
        Ok(())
    }

    fn set_combo_box_selected_value(&self, field: FieldId, item: u32) -> Result<()> {
        self.record("set_combo_box_selected_value")?;
        self.check_field(field)?;
        self.state.lock().combo_selection.insert(field, item);
        Ok(())
    }

    fn command_link_clicked(&self, field: FieldId) -> Result<()> {
        self.record("command_link_clicked")?;
        self.check_field(field)
    }

    fn serialization(&self) -> Result<SerializationResponse> {
        self.record("serialization")?;
        let state = self.state.lock();
        let (status_text, status_icon) = state.serialization_status.clone();
        Ok(SerializationResponse {
            response: state.serialization_code,
            serialization: Some(CredentialSerialization {
                auth_package: 1,
                provider: None,
                flags: 0,
                data: b"mock-credential".to_vec(),
            }),
            status_text,
            status_icon,
        })
    }

    fn report_result(&self, status: NtStatus, _substatus: NtStatus) -> Result<StatusReport> {
        self.record("report_result")?;
        Ok(StatusReport {
            status_text: (!status.is_success()).then(|| format!("status {}", status.0)),
            status_icon: StatusIcon::None,
        })
    }

    fn into_connectable(self: Arc<Self>) -> Option<Arc<dyn ConnectableCredential>> {
        if self.connectable {
            Some(self)
        } else {
            None
        }
    }
}

impl ConnectableCredential for MockCredential {
    fn connect(&self, status: &dyn QueryContinueWithStatus) -> Result<()> {
        self.record("connect")?;
        status.set_status_message("Connecting")?;
        status.query_continue()?;
        self.state.lock().connected = true;
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        self.record("disconnect")?;
        self.state.lock().connected = false;
        Ok(())
    }
}

struct MockProviderState {
    log: CallLog,
    scenario: Option<UsageScenario>,
    serialization: Option<CredentialSerialization>,
    events: Option<(Arc<dyn ProviderEvents>, usize)>,
}

/// Scriptable wrapped provider with a fixed set of tiles
pub struct MockProvider {
    fields: u32,
    credentials: Vec<Arc<MockCredential>>,
    state: Mutex<MockProviderState>,
}

impl MockProvider {
    fn build(fields: u32, credentials: Vec<Arc<MockCredential>>) -> Arc<Self> {
        Arc::new(Self {
            fields,
            credentials,
            state: Mutex::new(MockProviderState {
                log: CallLog::default(),
                scenario: None,
                serialization: None,
                events: None,
            }),
        })
    }

    /// Provider whose `count` tiles are connectable and declare `fields` fields
    pub fn new(fields: u32, count: u32) -> Arc<Self> {
        Self::build(
            fields,
            (0..count).map(|_| MockCredential::connectable(fields)).collect(),
        )
    }

    /// Provider whose tiles lack the connect capability
    pub fn with_plain_credentials(fields: u32, count: u32) -> Arc<Self> {
        Self::build(
            fields,
            (0..count).map(|_| MockCredential::plain(fields)).collect(),
        )
    }

    /// Tile at `index`, for inspection
    pub fn credential(&self, index: usize) -> Option<Arc<MockCredential>> {
        self.credentials.get(index).cloned()
    }

    /// Calls made to `operation` so far
    pub fn calls(&self, operation: &str) -> usize {
        self.state.lock().log.count(operation)
    }

    /// Fail the next call to `operation` with `error`
    pub fn fail_next(&self, operation: &'static str, error: CredentialError) {
        self.state.lock().log.failures.insert(operation, error);
    }

    /// Scenario last accepted
    pub fn scenario(&self) -> Option<UsageScenario> {
        self.state.lock().scenario
    }

    /// Serialization last received
    pub fn last_serialization(&self) -> Option<CredentialSerialization> {
        self.state.lock().serialization.clone()
    }

    /// Whether a provider sink is attached
    pub fn is_advised(&self) -> bool {
        self.state.lock().events.is_some()
    }

    /// Tell the attached sink that the tiles changed
    pub fn notify_changed(&self) -> Result<()> {
        let (events, context) = self
            .state
            .lock()
            .events
            .clone()
            .ok_or_else(|| CredentialError::unexpected("mock provider has no sink"))?;
        events.credentials_changed(context)
    }

    fn record(&self, operation: &'static str) -> Result<()> {
        self.state.lock().log.record(operation)
    }
}

impl CredentialProvider for MockProvider {
    fn set_usage_scenario(&self, scenario: UsageScenario, _flags: u32) -> Result<()> {
        self.record("set_usage_scenario")?;
        self.state.lock().scenario = Some(scenario);
        Ok(())
    }

    fn set_serialization(&self, serialization: &CredentialSerialization) -> Result<()> {
        self.record("set_serialization")?;
        self.state.lock().serialization = Some(serialization.clone());
        Ok(())
    }

    fn advise(&self, events: Arc<dyn ProviderEvents>, advise_context: usize) -> Result<()> {
        self.record("advise")?;
        self.state.lock().events = Some((events, advise_context));
        Ok(())
    }

    fn unadvise(&self) -> Result<()> {
        self.record("unadvise")?;
        let released = self.state.lock().events.take();
        drop(released);
        Ok(())
    }

    fn field_descriptor_count(&self) -> Result<u32> {
        self.record("field_descriptor_count")?;
        Ok(self.fields)
    }

    fn field_descriptor_at(&self, index: FieldId) -> Result<FieldDescriptor> {
        self.record("field_descriptor_at")?;
        if index.index() >= self.fields {
            return Err(out_of_range(index, self.fields));
        }
        Ok(FieldDescriptor::new(
            index,
            mock_field_kind(index.index()),
            format!("Field {}", index.index()),
        ))
    }

    fn credential_count(&self) -> Result<CredentialCount> {
        self.record("credential_count")?;
        Ok(CredentialCount {
            count: u32::try_from(self.credentials.len()).unwrap_or(u32::MAX),
            default: None,
            auto_logon_with_default: false,
        })
    }

    fn credential_at(&self, index: u32) -> Result<Arc<dyn Credential>> {
        self.record("credential_at")?;
        let credential = usize::try_from(index)
            .ok()
            .and_then(|index| self.credentials.get(index))
            .cloned()
            .ok_or_else(|| {
                CredentialError::invalid_argument(format!("no credential at index {index}"))
            })?;
        Ok(credential)
    }
}

/// Component factory that hands out one preset provider
pub struct MockFactory {
    provider: Option<Arc<dyn CredentialProvider>>,
    requests: Mutex<Vec<ProviderId>>,
}

impl MockFactory {
    /// Factory returning `provider` for every request
    pub fn with_provider(provider: Arc<MockProvider>) -> Arc<Self> {
        Arc::new(Self {
            provider: Some(provider),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Factory for which every request fails
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            provider: None,
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Number of successful creations
    pub fn created(&self) -> usize {
        if self.provider.is_some() {
            self.requests.lock().len()
        } else {
            0
        }
    }

    /// Every identity requested so far
    pub fn requests(&self) -> Vec<ProviderId> {
        self.requests.lock().clone()
    }
}

impl ComponentFactory for MockFactory {
    fn create_provider(&self, id: ProviderId) -> Result<Arc<dyn CredentialProvider>> {
        self.requests.lock().push(id);
        self.provider
            .clone()
            .ok_or_else(|| CredentialError::failed(0x8004_0154, format!("class {id} not registered")))
    }
}
