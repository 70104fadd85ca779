//! The plugin contract between the host UI, providers, tiles and sinks
//!
//! All operations are synchronous call/return. Objects are shared through
//! `Arc` and must tolerate re-entrant calls: a tile may call its sink while
//! the host is inside one of the tile's own methods.
//!
//! Credentials are passed to sinks by reference; the host recognises a
//! credential by its address, so a sink call must always name a tile the host
//! itself received from a provider.

use crate::errors::Result;
use crate::identifiers::{BitmapHandle, FieldId, NtStatus, ProviderId, WindowHandle};
use crate::types::{
    CheckboxValue, ComboBoxCount, CredentialCount, CredentialSerialization, FieldDescriptor,
    FieldInteractiveState, FieldState, FieldStatePair, SerializationResponse, StatusReport,
    UsageScenario,
};
use std::sync::Arc;

/// Provider-level operations the host drives to enumerate tiles
pub trait CredentialProvider: Send + Sync {
    /// Tell the provider which scenario it is being used in
    fn set_usage_scenario(&self, scenario: UsageScenario, flags: u32) -> Result<()>;

    /// Hand the provider a serialized credential to pre-populate a tile
    fn set_serialization(&self, serialization: &CredentialSerialization) -> Result<()>;

    /// Give the provider a sink for "credentials changed" notifications
    fn advise(&self, events: Arc<dyn ProviderEvents>, advise_context: usize) -> Result<()>;

    /// Release the sink handed out in [`CredentialProvider::advise`]
    fn unadvise(&self) -> Result<()>;

    /// Number of fields every tile of this provider has
    fn field_descriptor_count(&self) -> Result<u32>;

    /// Descriptor of the field at `index`
    fn field_descriptor_at(&self, index: FieldId) -> Result<FieldDescriptor>;

    /// Number of tiles and the default tile
    fn credential_count(&self) -> Result<CredentialCount>;

    /// Tile at `index`
    fn credential_at(&self, index: u32) -> Result<Arc<dyn Credential>>;
}

/// Optional provider capability for filtering other providers
pub trait ProviderFilter: Send + Sync {
    /// Clear `allow[i]` for every provider in `providers` that should be hidden
    fn filter(
        &self,
        scenario: UsageScenario,
        flags: u32,
        providers: &[ProviderId],
        allow: &mut [bool],
    ) -> Result<()>;

    /// Translate a remote credential into one this provider can consume
    fn update_remote_credential(
        &self,
        input: &CredentialSerialization,
    ) -> Result<CredentialSerialization>;
}

/// Per-tile operations the host drives directly
pub trait Credential: Send + Sync {
    /// Give the tile a sink for UI updates
    fn advise(&self, events: Arc<dyn CredentialEvents>) -> Result<()>;

    /// Release the sink handed out in [`Credential::advise`]
    fn unadvise(&self) -> Result<()>;

    /// Tile became the selected one; returns whether to log on immediately
    fn set_selected(&self) -> Result<bool>;

    /// Tile is no longer selected
    fn set_deselected(&self) -> Result<()>;

    /// Visibility and interaction state of a field
    fn field_state(&self, field: FieldId) -> Result<FieldStatePair>;

    /// Text of a text field
    fn string_value(&self, field: FieldId) -> Result<String>;

    /// Image of a tile-image field
    fn bitmap_value(&self, field: FieldId) -> Result<BitmapHandle>;

    /// State and label of a check box
    fn checkbox_value(&self, field: FieldId) -> Result<CheckboxValue>;

    /// Field the submit button is placed next to
    fn submit_button_value(&self, field: FieldId) -> Result<FieldId>;

    /// Item count and selection of a combo box
    fn combo_box_value_count(&self, field: FieldId) -> Result<ComboBoxCount>;

    /// Text of one combo box item
    fn combo_box_value_at(&self, field: FieldId, item: u32) -> Result<String>;

    /// User edited a text field
    fn set_string_value(&self, field: FieldId, value: &str) -> Result<()>;

    /// User toggled a check box
    fn set_checkbox_value(&self, field: FieldId, checked: bool) -> Result<()>;

    /// User picked a combo box item
    fn set_combo_box_selected_value(&self, field: FieldId, item: u32) -> Result<()>;

    /// User clicked a command link
    fn command_link_clicked(&self, field: FieldId) -> Result<()>;

    /// Produce the serialized credential
    fn serialization(&self) -> Result<SerializationResponse>;

    /// Outcome of the logon attempt, purely informational
    fn report_result(&self, status: NtStatus, substatus: NtStatus) -> Result<StatusReport>;

    /// Connectable capability of this tile, if it has one
    fn into_connectable(self: Arc<Self>) -> Option<Arc<dyn ConnectableCredential>> {
        None
    }
}

/// Tiles that establish a network connection before producing a credential
pub trait ConnectableCredential: Credential {
    /// Connect, reporting progress through `status`
    fn connect(&self, status: &dyn QueryContinueWithStatus) -> Result<()>;

    /// Tear the connection down
    fn disconnect(&self) -> Result<()>;
}

/// Host callback used by connectable tiles while connecting
pub trait QueryContinueWithStatus: Send + Sync {
    /// `Ok` while the host still wants the connection attempt to continue
    fn query_continue(&self) -> Result<()>;

    /// Update the progress text shown to the user
    fn set_status_message(&self, message: &str) -> Result<()>;
}

/// Host sink through which tiles push UI updates
pub trait CredentialEvents: Send + Sync {
    /// Change field visibility
    fn set_field_state(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        state: FieldState,
    ) -> Result<()>;

    /// Change field interaction restriction
    fn set_field_interactive_state(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        state: FieldInteractiveState,
    ) -> Result<()>;

    /// Change field text
    fn set_field_string(&self, credential: &dyn Credential, field: FieldId, text: &str)
        -> Result<()>;

    /// Change field image
    fn set_field_bitmap(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        bitmap: BitmapHandle,
    ) -> Result<()>;

    /// Change check box state and label
    fn set_field_checkbox(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        checked: bool,
        label: &str,
    ) -> Result<()>;

    /// Select a combo box item
    fn set_field_combo_box_selected_item(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        item: u32,
    ) -> Result<()>;

    /// Remove a combo box item
    fn delete_field_combo_box_item(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        item: u32,
    ) -> Result<()>;

    /// Append a combo box item
    fn append_field_combo_box_item(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        item: &str,
    ) -> Result<()>;

    /// Move the submit button next to another field
    fn set_field_submit_button(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        adjacent_to: FieldId,
    ) -> Result<()>;

    /// Owner window for any UI the tile is about to create
    fn on_creating_window(&self) -> Result<WindowHandle>;
}

/// Host sink through which providers announce that their tiles changed
pub trait ProviderEvents: Send + Sync {
    /// Ask the host to re-enumerate tiles
    fn credentials_changed(&self, advise_context: usize) -> Result<()>;
}

/// Component-creation service used to instantiate wrapped providers
pub trait ComponentFactory: Send + Sync {
    /// Instantiate the provider registered under `id`
    fn create_provider(&self, id: ProviderId) -> Result<Arc<dyn CredentialProvider>>;
}

/// Address of a credential, the identity the host compares
pub fn credential_addr(credential: &dyn Credential) -> usize {
    credential as *const _ as *const () as usize
}
