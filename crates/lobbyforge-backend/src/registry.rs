//! The backend registry: resolves provider names to live providers.
//!
//! The registry is a name → factory map. Resolving constructs a fresh
//! provider instance wired to the caller's completion channel; it does not
//! log anyone in or create any session — that's the orchestrator's job.
//!
//! Names are case-insensitive ("Null", "null", and "NULL" are the same
//! provider), because the names typically come from config files and UI
//! dropdowns where casing is unreliable.

use std::collections::HashMap;

use crate::error::BackendError;
use crate::event::CompletionSender;
use crate::null::NullProvider;
use crate::provider::BackendProvider;

/// The fallback provider name. Always registered by
/// [`BackendRegistry::with_defaults`]; always resolvable there.
pub const NULL_PROVIDER: &str = "Null";

/// Constructs a provider instance wired to the given completion sender.
pub type ProviderFactory =
    Box<dyn Fn(CompletionSender) -> Box<dyn BackendProvider> + Send>;

/// Resolves provider names to provider instances.
pub struct BackendRegistry {
    /// Factories keyed by lowercased provider name.
    factories: HashMap<String, ProviderFactory>,
}

impl BackendRegistry {
    /// Creates an empty registry. Nothing is resolvable until registered.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Creates a registry with the `"Null"` fallback provider registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(NULL_PROVIDER, |events| {
            Box::new(NullProvider::new(events))
        });
        registry
    }

    /// Registers a provider factory under `name`, replacing any previous
    /// registration for the same (case-insensitive) name.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(CompletionSender) -> Box<dyn BackendProvider> + Send + 'static,
    {
        self.factories
            .insert(name.to_ascii_lowercase(), Box::new(factory));
    }

    /// Returns whether a provider is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_ascii_lowercase())
    }

    /// Resolves `name` into a fresh provider instance wired to `events`.
    ///
    /// # Errors
    /// [`BackendError::ProviderUnavailable`] when no factory is registered
    /// under the name. The registry itself is untouched by a failed resolve;
    /// a later resolve with a valid name still works.
    pub fn resolve(
        &self,
        name: &str,
        events: CompletionSender,
    ) -> Result<Box<dyn BackendProvider>, BackendError> {
        let factory = self
            .factories
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| BackendError::ProviderUnavailable(name.to_string()))?;
        Ok(factory(events))
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{completion_channel, BackendEpoch};

    fn sender() -> CompletionSender {
        let (tx, _rx) = completion_channel();
        // Receiver dropped: fine for resolution tests, events go nowhere.
        CompletionSender::new(tx, BackendEpoch(1))
    }

    #[test]
    fn test_with_defaults_registers_null() {
        let registry = BackendRegistry::with_defaults();
        assert!(registry.contains("Null"));
    }

    #[test]
    fn test_resolve_unknown_name_returns_provider_unavailable() {
        let registry = BackendRegistry::with_defaults();

        let result = registry.resolve("DoesNotExist", sender());

        assert!(matches!(
            result,
            Err(BackendError::ProviderUnavailable(name)) if name == "DoesNotExist"
        ));
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = BackendRegistry::with_defaults();

        assert!(registry.resolve("NULL", sender()).is_ok());
        assert!(registry.resolve("null", sender()).is_ok());
        assert!(registry.resolve("Null", sender()).is_ok());
    }

    #[test]
    fn test_failed_resolve_does_not_corrupt_registry() {
        let registry = BackendRegistry::with_defaults();

        assert!(registry.resolve("DoesNotExist", sender()).is_err());
        // A valid name still resolves afterwards.
        assert!(registry.resolve("Null", sender()).is_ok());
    }

    #[test]
    fn test_register_replaces_same_name_different_case() {
        let mut registry = BackendRegistry::new();
        registry.register("Steam", |events| Box::new(NullProvider::new(events)));
        registry.register("STEAM", |events| Box::new(NullProvider::new(events)));

        assert!(registry.contains("steam"));
        assert!(registry.resolve("sTeAm", sender()).is_ok());
    }
}
