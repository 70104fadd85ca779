//! Provider proxy registered with the host
//!
//! [`WrapperProvider`] presents itself to the host as an independent provider.
//! On the first supported scenario it instantiates the wrapped provider
//! through the [`ComponentFactory`], caches how many fields the wrapped tiles
//! have, and from then on answers every field query with one extra field
//! appended. Each tile the wrapped provider enumerates is handed to the host
//! inside a fresh [`WrapperCredential`].
//!
//! As a filter, the provider hides the wrapped provider from the host so the
//! user does not see the wrapped tile next to the wrapper tile.

use crate::credential::WrapperCredential;
use parking_lot::Mutex;
use std::sync::Arc;
use tilewrap_core::{
    ComponentFactory, Credential, CredentialCount, CredentialError, CredentialProvider,
    CredentialSerialization, FieldDescriptor, FieldId, FieldKind, FieldRoute, ProviderEvents,
    ProviderFilter, ProviderId, Result, SyntheticField, UsageScenario, WrapperSettings,
};

struct ProviderState {
    wrapped: Option<Arc<dyn CredentialProvider>>,
    // Cached from the last successful wrapped field count query.
    synthetic: SyntheticField,
}

/// Provider proxy wrapping one externally created provider
pub struct WrapperProvider {
    settings: Arc<WrapperSettings>,
    factory: Arc<dyn ComponentFactory>,
    state: Mutex<ProviderState>,
}

impl WrapperProvider {
    /// Create a provider that will instantiate its wrapped provider through `factory`
    pub fn new(settings: WrapperSettings, factory: Arc<dyn ComponentFactory>) -> Self {
        tracing::debug!(wrapped = %settings.wrapped_provider, "creating wrapper provider");
        Self {
            settings: Arc::new(settings),
            factory,
            state: Mutex::new(ProviderState {
                wrapped: None,
                synthetic: SyntheticField::after(0),
            }),
        }
    }

    /// Settings shared with every tile this provider creates
    pub fn settings(&self) -> &WrapperSettings {
        &self.settings
    }

    /// Field count of the wrapped tiles as last reported
    pub fn wrapped_field_count(&self) -> u32 {
        self.state.lock().synthetic.wrapped_count()
    }

    /// Whether the wrapped provider has been instantiated
    pub fn is_bound(&self) -> bool {
        self.state.lock().wrapped.is_some()
    }

    fn wrapped(&self, operation: &'static str) -> Result<Arc<dyn CredentialProvider>> {
        self.state.lock().wrapped.clone().ok_or_else(|| {
            CredentialError::unexpected(format!("{operation}: no wrapped provider"))
        })
    }

    fn bind_wrapped(&self) -> Result<Arc<dyn CredentialProvider>> {
        if let Some(wrapped) = self.state.lock().wrapped.clone() {
            return Ok(wrapped);
        }

        let id = self.settings.wrapped_provider;
        let created = self.factory.create_provider(id).map_err(|error| {
            tracing::warn!(provider = %id, %error, "failed to create wrapped provider");
            CredentialError::allocation(format!("wrapped provider {id}: {error}"))
        })?;

        let mut state = self.state.lock();
        Ok(state.wrapped.get_or_insert(created).clone())
    }

    fn is_wrapped_provider(&self, id: &ProviderId) -> bool {
        *id == self.settings.wrapped_provider
    }
}

impl CredentialProvider for WrapperProvider {
    fn set_usage_scenario(&self, scenario: UsageScenario, flags: u32) -> Result<()> {
        tracing::debug!(%scenario, flags, "set_usage_scenario");
        if scenario != self.settings.scenario {
            return Err(CredentialError::not_supported(scenario));
        }

        let wrapped = self.bind_wrapped()?;
        wrapped.set_usage_scenario(scenario, flags)?;

        // Prime the cached field count before the host starts asking for fields.
        self.field_descriptor_count()?;
        Ok(())
    }

    fn set_serialization(&self, serialization: &CredentialSerialization) -> Result<()> {
        tracing::debug!("set_serialization");
        self.wrapped("set_serialization")?
            .set_serialization(serialization)
    }

    fn advise(&self, events: Arc<dyn ProviderEvents>, advise_context: usize) -> Result<()> {
        tracing::debug!(advise_context, "advise");
        self.wrapped("advise")?.advise(events, advise_context)
    }

    fn unadvise(&self) -> Result<()> {
        tracing::debug!("unadvise");
        self.wrapped("unadvise")?.unadvise()
    }

    fn field_descriptor_count(&self) -> Result<u32> {
        let wrapped = self.wrapped("field_descriptor_count")?;
        let wrapped_count = wrapped.field_descriptor_count()?;
        let synthetic = SyntheticField::after(wrapped_count);
        let count = synthetic.augmented_count().ok_or_else(|| {
            CredentialError::unexpected(format!(
                "wrapped provider reports {wrapped_count} fields, no room for another"
            ))
        })?;

        self.state.lock().synthetic = synthetic;
        tracing::debug!(wrapped_count, count, "field_descriptor_count");
        Ok(count)
    }

    fn field_descriptor_at(&self, index: FieldId) -> Result<FieldDescriptor> {
        tracing::debug!(field = index.index(), "field_descriptor_at");
        let (wrapped, synthetic) = {
            let state = self.state.lock();
            let wrapped = state.wrapped.clone().ok_or_else(|| {
                CredentialError::unexpected("field_descriptor_at: no wrapped provider")
            })?;
            (wrapped, state.synthetic)
        };

        match synthetic.route(index) {
            FieldRoute::Synthetic => Ok(FieldDescriptor::new(
                index,
                FieldKind::Checkbox,
                self.settings.toggle_label.clone(),
            )),
            FieldRoute::Wrapped(field) => {
                let descriptor = wrapped.field_descriptor_at(field)?;
                tracing::trace!(
                    field = descriptor.field_id.index(),
                    kind = ?descriptor.kind,
                    "wrapped field descriptor"
                );
                Ok(descriptor)
            }
        }
    }

    fn credential_count(&self) -> Result<CredentialCount> {
        let count = self.wrapped("credential_count")?.credential_count()?;
        tracing::debug!(
            count = count.count,
            default = ?count.default,
            auto_logon = count.auto_logon_with_default,
            "credential_count"
        );
        Ok(count)
    }

    fn credential_at(&self, index: u32) -> Result<Arc<dyn Credential>> {
        tracing::debug!(index, "credential_at");
        let wrapped = self.wrapped("credential_at")?;
        let credential = wrapped.credential_at(index)?;

        let connectable = credential.into_connectable().ok_or_else(|| {
            tracing::warn!(index, "wrapped credential is not connectable");
            CredentialError::no_interface(format!(
                "credential_at: wrapped credential {index} is not connectable"
            ))
        })?;

        let tile = WrapperCredential::new(self.settings.clone());
        tile.initialize(connectable, self.wrapped_field_count())?;
        Ok(tile)
    }
}

impl ProviderFilter for WrapperProvider {
    fn filter(
        &self,
        scenario: UsageScenario,
        flags: u32,
        providers: &[ProviderId],
        allow: &mut [bool],
    ) -> Result<()> {
        tracing::debug!(%scenario, flags, providers = providers.len(), "filter");
        if scenario != self.settings.scenario {
            return Ok(());
        }
        if providers.len() != allow.len() {
            return Err(CredentialError::invalid_argument(format!(
                "filter: {} providers but {} allow flags",
                providers.len(),
                allow.len()
            )));
        }

        for (id, allowed) in providers.iter().zip(allow.iter_mut()) {
            if self.is_wrapped_provider(id) {
                *allowed = false;
                tracing::debug!(provider = %id, "filtered out wrapped provider");
            }
        }
        Ok(())
    }

    fn update_remote_credential(
        &self,
        _input: &CredentialSerialization,
    ) -> Result<CredentialSerialization> {
        tracing::debug!("update_remote_credential");
        Err(CredentialError::not_implemented("update_remote_credential"))
    }
}

impl Drop for WrapperProvider {
    fn drop(&mut self) {
        tracing::debug!(bound = self.state.get_mut().wrapped.is_some(), "dropping wrapper provider");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tilewrap_core::errors::E_NOINTERFACE;
    use tilewrap_testkit::{MockFactory, MockProvider};

    fn provider_with(fields: u32) -> (WrapperProvider, Arc<MockProvider>, Arc<MockFactory>) {
        let wrapped = MockProvider::new(fields, 1);
        let factory = MockFactory::with_provider(wrapped.clone());
        let provider = WrapperProvider::new(WrapperSettings::default(), factory.clone());
        (provider, wrapped, factory)
    }

    #[test]
    fn test_unsupported_scenario_rejected() {
        let (provider, _, factory) = provider_with(3);
        let err = provider
            .set_usage_scenario(UsageScenario::Logon, 0)
            .unwrap_err();
        assert_matches!(err, CredentialError::NotSupported { .. });
        assert_eq!(factory.created(), 0);
        assert!(!provider.is_bound());
    }

    #[test]
    fn test_wrapped_created_once() {
        let (provider, wrapped, factory) = provider_with(3);
        provider
            .set_usage_scenario(UsageScenario::PreLogonAccessProvider, 0)
            .unwrap();
        provider
            .set_usage_scenario(UsageScenario::PreLogonAccessProvider, 0)
            .unwrap();
        assert_eq!(factory.created(), 1);
        assert_eq!(wrapped.calls("set_usage_scenario"), 2);
        assert_eq!(provider.wrapped_field_count(), 3);
    }

    #[test]
    fn test_factory_failure_is_allocation_failure() {
        let factory = MockFactory::failing();
        let provider = WrapperProvider::new(WrapperSettings::default(), factory);
        let err = provider
            .set_usage_scenario(UsageScenario::PreLogonAccessProvider, 0)
            .unwrap_err();
        assert_matches!(err, CredentialError::AllocationFailed { .. });
    }

    #[test]
    fn test_wrapped_scenario_failure_propagates() {
        let (provider, wrapped, _) = provider_with(3);
        wrapped.fail_next("set_usage_scenario", CredentialError::failed(0x8000_4005, "no"));
        let err = provider
            .set_usage_scenario(UsageScenario::PreLogonAccessProvider, 0)
            .unwrap_err();
        assert_eq!(err, CredentialError::failed(0x8000_4005, "no"));
        assert_eq!(wrapped.calls("field_descriptor_count"), 0);
    }

    #[test]
    fn test_unbound_operations_are_unexpected() {
        let (provider, _, _) = provider_with(3);
        assert!(provider.field_descriptor_count().unwrap_err().is_unexpected());
        assert!(provider
            .field_descriptor_at(FieldId::new(0))
            .unwrap_err()
            .is_unexpected());
        assert!(provider.credential_count().unwrap_err().is_unexpected());
        assert!(provider.credential_at(0).err().unwrap().is_unexpected());
        assert!(provider.unadvise().unwrap_err().is_unexpected());
    }

    #[test]
    fn test_descriptor_remapping() {
        let (provider, wrapped, _) = provider_with(3);
        provider
            .set_usage_scenario(UsageScenario::PreLogonAccessProvider, 0)
            .unwrap();

        assert_eq!(provider.field_descriptor_count().unwrap(), 4);
        let synthetic = provider.field_descriptor_at(FieldId::new(3)).unwrap();
        assert_eq!(synthetic.kind, FieldKind::Checkbox);
        assert_eq!(synthetic.label, "Use SSO");
        assert_eq!(synthetic.field_id, FieldId::new(3));

        for index in 0..3 {
            let field = FieldId::new(index);
            assert_eq!(
                provider.field_descriptor_at(field).unwrap(),
                wrapped.field_descriptor_at(field).unwrap()
            );
        }
    }

    #[test]
    fn test_non_connectable_credential_rejected() {
        let wrapped = MockProvider::with_plain_credentials(3, 1);
        let factory = MockFactory::with_provider(wrapped);
        let provider = WrapperProvider::new(WrapperSettings::default(), factory);
        provider
            .set_usage_scenario(UsageScenario::PreLogonAccessProvider, 0)
            .unwrap();
        let err = provider.credential_at(0).err().unwrap();
        assert_matches!(err, CredentialError::NoInterface { .. });
        assert_eq!(err.hresult(), E_NOINTERFACE);
    }

    #[test]
    fn test_filter_hides_wrapped_provider() {
        let (provider, _, _) = provider_with(3);
        let other = ProviderId::random();
        let wrapped_id = provider.settings().wrapped_provider;
        let providers = [other, wrapped_id, other, wrapped_id];
        let mut allow = [true; 4];

        provider
            .filter(UsageScenario::PreLogonAccessProvider, 0, &providers, &mut allow)
            .unwrap();
        assert_eq!(allow, [true, false, true, false]);
    }

    #[test]
    fn test_filter_ignores_other_scenarios() {
        let (provider, _, _) = provider_with(3);
        let providers = [provider.settings().wrapped_provider];
        let mut allow = [true];
        provider
            .filter(UsageScenario::Logon, 0, &providers, &mut allow)
            .unwrap();
        assert_eq!(allow, [true]);
    }

    #[test]
    fn test_filter_rejects_mismatched_slices() {
        let (provider, _, _) = provider_with(3);
        let providers = [ProviderId::random(), ProviderId::random()];
        let mut allow = [true];
        let err = provider
            .filter(UsageScenario::PreLogonAccessProvider, 0, &providers, &mut allow)
            .unwrap_err();
        assert_matches!(err, CredentialError::InvalidArgument { .. });
    }

    #[test]
    fn test_update_remote_credential_not_implemented() {
        let (provider, _, _) = provider_with(3);
        let err = provider
            .update_remote_credential(&CredentialSerialization::default())
            .unwrap_err();
        assert_matches!(err, CredentialError::NotImplemented { .. });
    }
}
