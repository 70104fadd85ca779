//! Host-side sinks
//!
//! [`RecordingEvents`] plays the host's tile sink. It records every call
//! together with the address of the credential it named, which is how the
//! host identifies tiles.

use parking_lot::Mutex;
use std::sync::Arc;
use tilewrap_core::{
    credential_addr, BitmapHandle, Credential, CredentialEvents, FieldId, FieldInteractiveState,
    FieldState, ProviderEvents, QueryContinueWithStatus, Result, WindowHandle,
};

/// One call received by [`RecordingEvents`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    /// `set_field_state`
    FieldState {
        /// Address of the named credential
        credential: usize,
        /// Target field
        field: FieldId,
        /// New visibility
        state: FieldState,
    },
    /// `set_field_interactive_state`
    FieldInteractiveState {
        /// Address of the named credential
        credential: usize,
        /// Target field
        field: FieldId,
        /// New restriction
        state: FieldInteractiveState,
    },
    /// `set_field_string`
    FieldString {
        /// Address of the named credential
        credential: usize,
        /// Target field
        field: FieldId,
        /// New text
        text: String,
    },
    /// `set_field_bitmap`
    FieldBitmap {
        /// Address of the named credential
        credential: usize,
        /// Target field
        field: FieldId,
        /// New image
        bitmap: BitmapHandle,
    },
    /// `set_field_checkbox`
    FieldCheckbox {
        /// Address of the named credential
        credential: usize,
        /// Target field
        field: FieldId,
        /// New state
        checked: bool,
        /// New label
        label: String,
    },
    /// `set_field_combo_box_selected_item`
    ComboBoxSelected {
        /// Address of the named credential
        credential: usize,
        /// Target field
        field: FieldId,
        /// Selected item
        item: u32,
    },
    /// `delete_field_combo_box_item`
    ComboBoxDeleted {
        /// Address of the named credential
        credential: usize,
        /// Target field
        field: FieldId,
        /// Removed item
        item: u32,
    },
    /// `append_field_combo_box_item`
    ComboBoxAppended {
        /// Address of the named credential
        credential: usize,
        /// Target field
        field: FieldId,
        /// Appended text
        item: String,
    },
    /// `set_field_submit_button`
    SubmitButton {
        /// Address of the named credential
        credential: usize,
        /// Target field
        field: FieldId,
        /// Field the button now sits next to
        adjacent_to: FieldId,
    },
}

impl RecordedEvent {
    /// Address of the credential the call named
    pub fn credential(&self) -> usize {
        match self {
            Self::FieldState { credential, .. }
            | Self::FieldInteractiveState { credential, .. }
            | Self::FieldString { credential, .. }
            | Self::FieldBitmap { credential, .. }
            | Self::FieldCheckbox { credential, .. }
            | Self::ComboBoxSelected { credential, .. }
            | Self::ComboBoxDeleted { credential, .. }
            | Self::ComboBoxAppended { credential, .. }
            | Self::SubmitButton { credential, .. } => *credential,
        }
    }
}

type ReentryHook = Box<dyn Fn(&dyn Credential) + Send + Sync>;

/// Host tile sink that records every call
pub struct RecordingEvents {
    events: Mutex<Vec<RecordedEvent>>,
    windows_requested: Mutex<usize>,
    window: WindowHandle,
    hook: Option<ReentryHook>,
}

impl RecordingEvents {
    /// Sink that only records
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(None))
    }

    /// Sink that calls `hook` with the named credential after recording
    ///
    /// Lets a test call back into the tile from inside a sink notification,
    /// the way a real host does.
    pub fn with_hook<F>(hook: F) -> Arc<Self>
    where
        F: Fn(&dyn Credential) + Send + Sync + 'static,
    {
        Arc::new(Self::build(Some(Box::new(hook))))
    }

    fn build(hook: Option<ReentryHook>) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            windows_requested: Mutex::new(0),
            window: WindowHandle(0x0001_0010),
            hook,
        }
    }

    /// Snapshot of the calls received so far
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// Visibility changes received so far, in order
    pub fn field_states(&self) -> Vec<(FieldId, FieldState)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::FieldState { field, state, .. } => Some((*field, *state)),
                _ => None,
            })
            .collect()
    }

    /// Window handle returned from `on_creating_window`
    pub fn window(&self) -> WindowHandle {
        self.window
    }

    /// Number of `on_creating_window` calls
    pub fn windows_requested(&self) -> usize {
        *self.windows_requested.lock()
    }

    fn push(&self, credential: &dyn Credential, event: RecordedEvent) -> Result<()> {
        self.events.lock().push(event);
        if let Some(hook) = &self.hook {
            hook(credential);
        }
        Ok(())
    }
}

impl CredentialEvents for RecordingEvents {
    fn set_field_state(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        state: FieldState,
    ) -> Result<()> {
        let event = RecordedEvent::FieldState {
            credential: credential_addr(credential),
            field,
            state,
        };
        self.push(credential, event)
    }

    fn set_field_interactive_state(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        state: FieldInteractiveState,
    ) -> Result<()> {
        let event = RecordedEvent::FieldInteractiveState {
            credential: credential_addr(credential),
            field,
            state,
        };
        self.push(credential, event)
    }

    fn set_field_string(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        text: &str,
    ) -> Result<()> {
        let event = RecordedEvent::FieldString {
            credential: credential_addr(credential),
            field,
            text: text.to_string(),
        };
        self.push(credential, event)
    }

    fn set_field_bitmap(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        bitmap: BitmapHandle,
    ) -> Result<()> {
        let event = RecordedEvent::FieldBitmap {
            credential: credential_addr(credential),
            field,
            bitmap,
        };
        self.push(credential, event)
    }

    fn set_field_checkbox(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        checked: bool,
        label: &str,
    ) -> Result<()> {
        let event = RecordedEvent::FieldCheckbox {
            credential: credential_addr(credential),
            field,
            checked,
            label: label.to_string(),
        };
        self.push(credential, event)
    }

    fn set_field_combo_box_selected_item(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        item: u32,
    ) -> Result<()> {
        let event = RecordedEvent::ComboBoxSelected {
            credential: credential_addr(credential),
            field,
            item,
        };
        self.push(credential, event)
    }

    fn delete_field_combo_box_item(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        item: u32,
    ) -> Result<()> {
        let event = RecordedEvent::ComboBoxDeleted {
            credential: credential_addr(credential),
            field,
            item,
        };
        self.push(credential, event)
    }

    fn append_field_combo_box_item(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        item: &str,
    ) -> Result<()> {
        let event = RecordedEvent::ComboBoxAppended {
            credential: credential_addr(credential),
            field,
            item: item.to_string(),
        };
        self.push(credential, event)
    }

    fn set_field_submit_button(
        &self,
        credential: &dyn Credential,
        field: FieldId,
        adjacent_to: FieldId,
    ) -> Result<()> {
        let event = RecordedEvent::SubmitButton {
            credential: credential_addr(credential),
            field,
            adjacent_to,
        };
        self.push(credential, event)
    }

    fn on_creating_window(&self) -> Result<WindowHandle> {
        *self.windows_requested.lock() += 1;
        Ok(self.window)
    }
}

/// Host provider sink that records advise contexts it was notified with
#[derive(Default)]
pub struct RecordingProviderEvents {
    notifications: Mutex<Vec<usize>>,
}

impl RecordingProviderEvents {
    /// Contexts passed to `credentials_changed`, in order
    pub fn notifications(&self) -> Vec<usize> {
        self.notifications.lock().clone()
    }
}

impl ProviderEvents for RecordingProviderEvents {
    fn credentials_changed(&self, advise_context: usize) -> Result<()> {
        self.notifications.lock().push(advise_context);
        Ok(())
    }
}

/// Connection status callback that never cancels
#[derive(Default)]
pub struct AlwaysContinue {
    messages: Mutex<Vec<String>>,
}

impl AlwaysContinue {
    /// Status messages shown so far
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl QueryContinueWithStatus for AlwaysContinue {
    fn query_continue(&self) -> Result<()> {
        Ok(())
    }

    fn set_status_message(&self, message: &str) -> Result<()> {
        self.messages.lock().push(message.to_string());
        Ok(())
    }
}
