//! Sink proxy handed to the wrapped tile
//!
//! The wrapped tile reports UI changes through a [`CredentialEvents`] sink and
//! names itself as the credential. The host only recognises tiles it received
//! from a provider, so every call is re-addressed to the wrapper tile before it
//! reaches the host's sink.
//!
//! The proxy is reachable from the wrapped tile, which the wrapper tile owns.
//! It therefore keeps only `Weak` handles to the wrapper tile and to the host
//! sink; holding either strongly would close a cycle. The wrapper tile brackets
//! the proxy's useful life with [`WrapperCredentialEvents::initialize`] and
//! [`WrapperCredentialEvents::uninitialize`]. Outside that window every call
//! fails with `Unexpected` and nothing is forwarded.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tilewrap_core::{
    BitmapHandle, Credential, CredentialError, CredentialEvents, FieldId, FieldInteractiveState,
    FieldState, Result, WindowHandle, WrapperSettings,
};

/// Forwarding target, present only while the proxy is bound
struct EventsTarget {
    credential: Weak<dyn Credential>,
    host: Weak<dyn CredentialEvents>,
    synthetic: FieldId,
}

/// Strong handles resolved for the duration of one forwarded call
struct Resolved {
    credential: Arc<dyn Credential>,
    host: Arc<dyn CredentialEvents>,
    synthetic: FieldId,
}

/// [`CredentialEvents`] implementation standing between the wrapped tile and the host
pub struct WrapperCredentialEvents {
    target: Mutex<Option<EventsTarget>>,
    status_field: FieldId,
    connected_text: String,
}

impl WrapperCredentialEvents {
    /// Create an unbound proxy watching the status field named in `settings`
    pub fn new(settings: &WrapperSettings) -> Self {
        Self {
            target: Mutex::new(None),
            status_field: settings.status_field,
            connected_text: settings.connected_text.clone(),
        }
    }

    /// Bind to the wrapper tile and the host sink
    ///
    /// Both handles are weak. The caller must keep the host sink alive and call
    /// [`uninitialize`](Self::uninitialize) before releasing it.
    pub fn initialize(
        &self,
        credential: Weak<dyn Credential>,
        host: Weak<dyn CredentialEvents>,
        synthetic: FieldId,
    ) {
        tracing::debug!(synthetic = synthetic.index(), "binding credential events proxy");
        *self.target.lock() = Some(EventsTarget {
            credential,
            host,
            synthetic,
        });
    }

    /// Drop both handles; subsequent calls fail with `Unexpected`
    pub fn uninitialize(&self) {
        tracing::debug!("unbinding credential events proxy");
        self.target.lock().take();
    }

    /// Whether the proxy is currently bound
    pub fn is_bound(&self) -> bool {
        self.target.lock().is_some()
    }

    fn resolve(&self, operation: &'static str) -> Result<Resolved> {
        // Upgrade outside the lock: releasing an upgraded handle may drop the
        // wrapper tile, whose teardown calls back into `uninitialize`.
        let (credential, host, synthetic) = {
            let guard = self.target.lock();
            let target = guard.as_ref().ok_or_else(|| {
                CredentialError::unexpected(format!("{operation}: events proxy is not bound"))
            })?;
            (
                target.credential.clone(),
                target.host.clone(),
                target.synthetic,
            )
        };

        match (credential.upgrade(), host.upgrade()) {
            (Some(credential), Some(host)) => Ok(Resolved {
                credential,
                host,
                synthetic,
            }),
            _ => Err(CredentialError::unexpected(format!(
                "{operation}: wrapper credential or host sink already released"
            ))),
        }
    }

    fn toggle_visibility(&self, status_text: &str) -> FieldState {
        if status_text == self.connected_text {
            FieldState::Hidden
        } else {
            FieldState::DisplayInSelectedTile
        }
    }
}

impl CredentialEvents for WrapperCredentialEvents {
    fn set_field_state(
        &self,
        _credential: &dyn Credential,
        field: FieldId,
        state: FieldState,
    ) -> Result<()> {
        tracing::debug!(field = field.index(), ?state, "set_field_state");
        let target = self.resolve("set_field_state")?;
        target
            .host
            .set_field_state(target.credential.as_ref(), field, state)
    }

    fn set_field_interactive_state(
        &self,
        _credential: &dyn Credential,
        field: FieldId,
        state: FieldInteractiveState,
    ) -> Result<()> {
        tracing::debug!(field = field.index(), ?state, "set_field_interactive_state");
        let target = self.resolve("set_field_interactive_state")?;
        target
            .host
            .set_field_interactive_state(target.credential.as_ref(), field, state)
    }

    fn set_field_string(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        text: &str,
    ) -> Result<()> {
        tracing::debug!(field = field.index(), "set_field_string");
        tracing::trace!(field = field.index(), text, "set_field_string text");
        let target = self.resolve("set_field_string")?;
        target
            .host
            .set_field_string(target.credential.as_ref(), field, text)?;

        if field != self.status_field {
            return Ok(());
        }

        // Hide the toggle once the wrapped tile reports an established connection.
        let visibility = self.toggle_visibility(text);
        tracing::debug!(
            synthetic = target.synthetic.index(),
            ?visibility,
            "connection status changed"
        );
        self.set_field_state(credential, target.synthetic, visibility)
    }

    fn set_field_bitmap(
        &self,
        _credential: &dyn Credential,
        field: FieldId,
        bitmap: BitmapHandle,
    ) -> Result<()> {
        tracing::debug!(field = field.index(), "set_field_bitmap");
        let target = self.resolve("set_field_bitmap")?;
        target
            .host
            .set_field_bitmap(target.credential.as_ref(), field, bitmap)
    }

    fn set_field_checkbox(
        &self,
        _credential: &dyn Credential,
        field: FieldId,
        checked: bool,
        label: &str,
    ) -> Result<()> {
        tracing::debug!(field = field.index(), checked, "set_field_checkbox");
        let target = self.resolve("set_field_checkbox")?;
        target
            .host
            .set_field_checkbox(target.credential.as_ref(), field, checked, label)
    }

    fn set_field_combo_box_selected_item(
        &self,
        _credential: &dyn Credential,
        field: FieldId,
        item: u32,
    ) -> Result<()> {
        tracing::debug!(field = field.index(), item, "set_field_combo_box_selected_item");
        let target = self.resolve("set_field_combo_box_selected_item")?;
        target
            .host
            .set_field_combo_box_selected_item(target.credential.as_ref(), field, item)
    }

    fn delete_field_combo_box_item(
        &self,
        _credential: &dyn Credential,
        field: FieldId,
        item: u32,
    ) -> Result<()> {
        tracing::debug!(field = field.index(), item, "delete_field_combo_box_item");
        let target = self.resolve("delete_field_combo_box_item")?;
        target
            .host
            .delete_field_combo_box_item(target.credential.as_ref(), field, item)
    }

    fn append_field_combo_box_item(
        &self,
        _credential: &dyn Credential,
        field: FieldId,
        item: &str,
    ) -> Result<()> {
        tracing::debug!(field = field.index(), "append_field_combo_box_item");
        let target = self.resolve("append_field_combo_box_item")?;
        target
            .host
            .append_field_combo_box_item(target.credential.as_ref(), field, item)
    }

    fn set_field_submit_button(
        &self,
        _credential: &dyn Credential,
        field: FieldId,
        adjacent_to: FieldId,
    ) -> Result<()> {
        tracing::debug!(
            field = field.index(),
            adjacent_to = adjacent_to.index(),
            "set_field_submit_button"
        );
        let target = self.resolve("set_field_submit_button")?;
        target
            .host
            .set_field_submit_button(target.credential.as_ref(), field, adjacent_to)
    }

    fn on_creating_window(&self) -> Result<WindowHandle> {
        tracing::debug!("on_creating_window");
        let target = self.resolve("on_creating_window")?;
        target.host.on_creating_window()
    }
}
