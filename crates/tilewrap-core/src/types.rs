//! Value types exchanged across the provider contract

use crate::identifiers::{FieldId, ProviderId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Situation in which the host enumerates providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageScenario {
    /// Interactive logon
    Logon,
    /// Unlocking a locked workstation
    UnlockWorkstation,
    /// Changing a password
    ChangePassword,
    /// Credential prompt raised by an application
    CredUi,
    /// Network access established before logon
    PreLogonAccessProvider,
}

impl fmt::Display for UsageScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Logon => "logon",
            Self::UnlockWorkstation => "unlock_workstation",
            Self::ChangePassword => "change_password",
            Self::CredUi => "cred_ui",
            Self::PreLogonAccessProvider => "pre_logon_access_provider",
        };
        f.write_str(name)
    }
}

/// Kind of a field as declared by its descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Placeholder for an unused slot
    Invalid,
    /// Large read-only text
    LargeText,
    /// Small read-only text
    SmallText,
    /// Clickable link
    CommandLink,
    /// Editable text box
    EditText,
    /// Masked password box
    PasswordText,
    /// Tile image
    TileImage,
    /// Check box with label
    Checkbox,
    /// Drop-down list
    ComboBox,
    /// Submit arrow
    SubmitButton,
}

/// Visibility of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldState {
    /// Not shown
    Hidden,
    /// Shown only when the tile is selected
    DisplayInSelectedTile,
    /// Shown only when the tile is not selected
    DisplayInDeselectedTile,
    /// Always shown
    DisplayInBoth,
}

/// Interaction restrictions on a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldInteractiveState {
    /// No restriction
    #[default]
    None,
    /// Visible but not editable
    ReadOnly,
    /// Greyed out
    Disabled,
    /// Has keyboard focus
    Focused,
}

/// Visibility and interaction state reported together for one field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldStatePair {
    /// Visibility
    pub state: FieldState,
    /// Interaction restriction
    pub interactive: FieldInteractiveState,
}

impl FieldStatePair {
    /// Build a pair
    pub const fn new(state: FieldState, interactive: FieldInteractiveState) -> Self {
        Self { state, interactive }
    }
}

/// Declaration of one field of a tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Position of the field in the tile
    pub field_id: FieldId,
    /// Field kind
    pub kind: FieldKind,
    /// Label shown next to or inside the field
    pub label: String,
    /// Optional well-known field type identifier
    pub guid: Option<Uuid>,
}

impl FieldDescriptor {
    /// Build a descriptor without a field type identifier
    pub fn new(field_id: FieldId, kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            field_id,
            kind,
            label: label.into(),
            guid: None,
        }
    }
}

/// Icon shown next to status text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StatusIcon {
    /// No icon
    #[default]
    None,
    /// Error icon
    Error,
    /// Warning icon
    Warning,
    /// Success icon
    Success,
}

/// Outcome a tile reports when the host asks for its serialized credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SerializationResponseCode {
    /// Nothing produced, tile is not finished
    NoCredentialNotFinished,
    /// Nothing produced, tile is finished
    NoCredentialFinished,
    /// A credential was produced and should be submitted
    ReturnCredentialFinished,
    /// No credential and no further UI
    ReturnNoCredentialFinished,
}

/// Packed credential handed to the authentication package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSerialization {
    /// Authentication package identifier
    pub auth_package: u32,
    /// Provider that produced the buffer
    pub provider: Option<ProviderId>,
    /// Package-specific flags
    pub flags: u32,
    /// Serialized credential bytes
    pub data: Vec<u8>,
}

/// Everything a tile returns from a serialization request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializationResponse {
    /// What the host should do with the result
    pub response: SerializationResponseCode,
    /// Serialized credential, if one was produced
    pub serialization: Option<CredentialSerialization>,
    /// Optional status text for the user
    pub status_text: Option<String>,
    /// Icon accompanying the status text
    pub status_icon: StatusIcon,
}

impl SerializationResponse {
    /// Response carrying no credential and no status
    pub fn empty(response: SerializationResponseCode) -> Self {
        Self {
            response,
            serialization: None,
            status_text: None,
            status_icon: StatusIcon::None,
        }
    }
}

/// Optional status a tile reports after the host tried its credential
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Status text to display
    pub status_text: Option<String>,
    /// Icon accompanying the text
    pub status_icon: StatusIcon,
}

/// Number of tiles a provider offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CredentialCount {
    /// Tile count
    pub count: u32,
    /// Index of the default tile, if any
    pub default: Option<u32>,
    /// Submit the default tile without user interaction
    pub auto_logon_with_default: bool,
}

/// Combo box item count and current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboBoxCount {
    /// Number of items
    pub items: u32,
    /// Selected item index
    pub selected: u32,
}

/// Check box state and label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckboxValue {
    /// Whether the box is checked
    pub checked: bool,
    /// Label shown next to the box
    pub label: String,
}
