//! Tile proxy handed to the host
//!
//! [`WrapperCredential`] owns one wrapped connectable tile and answers for one
//! extra field: a check box appended after the wrapped tile's own fields.
//! Calls for any other field are forwarded untouched. The check box gates
//! submission: while it is cleared, a serialization request reports that no
//! credential was produced, whatever the wrapped tile computed.
//!
//! While the host has a sink attached, the tile also owns the sink proxy given
//! to the wrapped tile (see [`crate::events`]). The binding is torn down on
//! `unadvise`, on a repeated `advise`, and when the tile is dropped.

use crate::events::WrapperCredentialEvents;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tilewrap_core::{
    BitmapHandle, CheckboxValue, ComboBoxCount, ConnectableCredential, Credential,
    CredentialError, CredentialEvents, FieldId, FieldInteractiveState, FieldRoute, FieldState,
    FieldStatePair, NtStatus, QueryContinueWithStatus, Result, SerializationResponse,
    SerializationResponseCode, StatusReport, SyntheticField, WrapperSettings,
};

/// Live sink binding between one advise and the matching unadvise
struct EventsBinding {
    proxy: Arc<WrapperCredentialEvents>,
    // Keeps the host sink alive for the proxy's weak handle.
    host: Arc<dyn CredentialEvents>,
}

impl Drop for EventsBinding {
    fn drop(&mut self) {
        // Must run before `host` is released.
        self.proxy.uninitialize();
    }
}

struct CredentialState {
    // Declared before `wrapped` so teardown drops the binding first.
    events: Option<EventsBinding>,
    wrapped: Option<Arc<dyn ConnectableCredential>>,
    synthetic: SyntheticField,
    use_sso: bool,
}

/// Who answers a field call, resolved under the state lock
enum Target {
    Synthetic,
    Wrapped(Arc<dyn ConnectableCredential>),
}

/// Tile proxy wrapping one connectable tile of the wrapped provider
pub struct WrapperCredential {
    this: Weak<WrapperCredential>,
    settings: Arc<WrapperSettings>,
    state: Mutex<CredentialState>,
}

impl WrapperCredential {
    /// Create an unbound tile; bind it with [`initialize`](Self::initialize)
    pub fn new(settings: Arc<WrapperSettings>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            settings,
            state: Mutex::new(CredentialState {
                events: None,
                wrapped: None,
                synthetic: SyntheticField::after(0),
                use_sso: false,
            }),
        })
    }

    /// Take ownership of `wrapped`, releasing any tile bound earlier
    pub fn initialize(
        &self,
        wrapped: Arc<dyn ConnectableCredential>,
        wrapped_field_count: u32,
    ) -> Result<()> {
        tracing::debug!(wrapped_field_count, "initializing wrapper credential");
        let previous = {
            let mut state = self.state.lock();
            state.synthetic = SyntheticField::after(wrapped_field_count);
            state.wrapped.replace(wrapped)
        };
        drop(previous);
        Ok(())
    }

    /// Index of the appended check box
    pub fn synthetic_field(&self) -> FieldId {
        self.state.lock().synthetic.index()
    }

    /// Current state of the appended check box
    pub fn use_sso(&self) -> bool {
        self.state.lock().use_sso
    }

    /// Whether a host sink is currently attached
    pub fn is_advised(&self) -> bool {
        self.state.lock().events.is_some()
    }

    fn wrapped(&self, operation: &'static str) -> Result<Arc<dyn ConnectableCredential>> {
        self.state.lock().wrapped.clone().ok_or_else(|| {
            CredentialError::unexpected(format!("{operation}: no wrapped credential"))
        })
    }

    fn target(&self, field: FieldId, operation: &'static str) -> Result<Target> {
        let state = self.state.lock();
        match state.synthetic.route(field) {
            FieldRoute::Synthetic => Ok(Target::Synthetic),
            FieldRoute::Wrapped(_) => state.wrapped.clone().map(Target::Wrapped).ok_or_else(|| {
                CredentialError::unexpected(format!("{operation}: no wrapped credential"))
            }),
        }
    }

    /// Wrapped tile for a field kind the appended check box does not offer
    fn forward(
        &self,
        field: FieldId,
        operation: &'static str,
    ) -> Result<Arc<dyn ConnectableCredential>> {
        match self.target(field, operation)? {
            Target::Wrapped(wrapped) => Ok(wrapped),
            Target::Synthetic => Err(CredentialError::unexpected(format!(
                "{operation}: {field} is a check box"
            ))),
        }
    }

    fn release_events(&self) {
        let binding = self.state.lock().events.take();
        drop(binding);
    }
}

impl Credential for WrapperCredential {
    fn advise(&self, events: Arc<dyn CredentialEvents>) -> Result<()> {
        tracing::debug!("advise");
        self.release_events();

        let proxy = Arc::new(WrapperCredentialEvents::new(&self.settings));
        let this: Weak<dyn Credential> = self.this.clone();
        let wrapped = {
            let mut state = self.state.lock();
            proxy.initialize(this, Arc::downgrade(&events), state.synthetic.index());
            state.events = Some(EventsBinding {
                proxy: proxy.clone(),
                host: events,
            });
            state.wrapped.clone()
        };

        match wrapped {
            Some(wrapped) => wrapped.advise(proxy),
            None => Ok(()),
        }
    }

    fn unadvise(&self) -> Result<()> {
        tracing::debug!("unadvise");
        let wrapped = self.state.lock().wrapped.clone();
        if let Some(wrapped) = wrapped {
            if let Err(error) = wrapped.unadvise() {
                tracing::warn!(%error, "wrapped credential failed to unadvise");
            }
        }
        self.release_events();
        Ok(())
    }

    fn set_selected(&self) -> Result<bool> {
        tracing::debug!("set_selected");
        self.wrapped("set_selected")?.set_selected()
    }

    fn set_deselected(&self) -> Result<()> {
        tracing::debug!("set_deselected");
        self.wrapped("set_deselected")?.set_deselected()
    }

    fn field_state(&self, field: FieldId) -> Result<FieldStatePair> {
        tracing::debug!(field = field.index(), "field_state");
        match self.target(field, "field_state")? {
            Target::Synthetic => Ok(FieldStatePair::new(
                FieldState::DisplayInSelectedTile,
                FieldInteractiveState::None,
            )),
            Target::Wrapped(wrapped) => {
                let pair = wrapped.field_state(field)?;
                tracing::trace!(field = field.index(), state = ?pair.state, "wrapped field state");
                Ok(pair)
            }
        }
    }

    fn string_value(&self, field: FieldId) -> Result<String> {
        tracing::debug!(field = field.index(), "string_value");
        match self.target(field, "string_value")? {
            Target::Synthetic => Ok(self.settings.toggle_label.clone()),
            Target::Wrapped(wrapped) => wrapped.string_value(field),
        }
    }

    fn bitmap_value(&self, field: FieldId) -> Result<BitmapHandle> {
        tracing::debug!(field = field.index(), "bitmap_value");
        self.forward(field, "bitmap_value")?.bitmap_value(field)
    }

    fn checkbox_value(&self, field: FieldId) -> Result<CheckboxValue> {
        tracing::debug!(field = field.index(), "checkbox_value");
        match self.target(field, "checkbox_value")? {
            Target::Synthetic => Ok(CheckboxValue {
                checked: self.use_sso(),
                label: self.settings.toggle_label.clone(),
            }),
            Target::Wrapped(wrapped) => wrapped.checkbox_value(field),
        }
    }

    fn submit_button_value(&self, field: FieldId) -> Result<FieldId> {
        tracing::debug!(field = field.index(), "submit_button_value");
        self.forward(field, "submit_button_value")?
            .submit_button_value(field)
    }

    fn combo_box_value_count(&self, field: FieldId) -> Result<ComboBoxCount> {
        tracing::debug!(field = field.index(), "combo_box_value_count");
        self.forward(field, "combo_box_value_count")?
            .combo_box_value_count(field)
    }

    fn combo_box_value_at(&self, field: FieldId, item: u32) -> Result<String> {
        tracing::debug!(field = field.index(), item, "combo_box_value_at");
        self.forward(field, "combo_box_value_at")?
            .combo_box_value_at(field, item)
    }

    fn set_string_value(&self, field: FieldId, value: &str) -> Result<()> {
        tracing::debug!(field = field.index(), "set_string_value");
        self.forward(field, "set_string_value")?
            .set_string_value(field, value)
    }

    fn set_checkbox_value(&self, field: FieldId, checked: bool) -> Result<()> {
        tracing::debug!(field = field.index(), checked, "set_checkbox_value");
        match self.target(field, "set_checkbox_value")? {
            Target::Synthetic => {
                self.state.lock().use_sso = checked;
                Ok(())
            }
            Target::Wrapped(wrapped) => wrapped.set_checkbox_value(field, checked),
        }
    }

    fn set_combo_box_selected_value(&self, field: FieldId, item: u32) -> Result<()> {
        tracing::debug!(field = field.index(), item, "set_combo_box_selected_value");
        self.forward(field, "set_combo_box_selected_value")?
            .set_combo_box_selected_value(field, item)
    }

    fn command_link_clicked(&self, field: FieldId) -> Result<()> {
        tracing::debug!(field = field.index(), "command_link_clicked");
        self.forward(field, "command_link_clicked")?
            .command_link_clicked(field)
    }

    fn serialization(&self) -> Result<SerializationResponse> {
        let mut response = self.wrapped("serialization")?.serialization()?;
        let use_sso = self.use_sso();
        if !use_sso {
            response.response = SerializationResponseCode::NoCredentialFinished;
        }
        tracing::debug!(use_sso, response = ?response.response, "serialization");
        Ok(response)
    }

    fn report_result(&self, status: NtStatus, substatus: NtStatus) -> Result<StatusReport> {
        tracing::debug!(status = status.0, substatus = substatus.0, "report_result");
        self.wrapped("report_result")?
            .report_result(status, substatus)
    }

    fn into_connectable(self: Arc<Self>) -> Option<Arc<dyn ConnectableCredential>> {
        Some(self)
    }
}

impl ConnectableCredential for WrapperCredential {
    fn connect(&self, status: &dyn QueryContinueWithStatus) -> Result<()> {
        tracing::debug!("connect");
        let result = self.wrapped("connect")?.connect(status);
        tracing::debug!(ok = result.is_ok(), "connect returned");
        result
    }

    fn disconnect(&self) -> Result<()> {
        tracing::debug!("disconnect");
        self.wrapped("disconnect")?.disconnect()
    }
}

impl Drop for WrapperCredential {
    fn drop(&mut self) {
        tracing::debug!("dropping wrapper credential");
        let state = self.state.get_mut();
        state.events.take();
        state.wrapped.take();
    }
}
